use crate::llm::{SchemaProperty, SchemaType};

/// What the model is told to say when the documents do not cover a question.
pub const REFUSAL_MESSAGE: &str =
    "I'm sorry, I don't have information on that in our current policy manual.";

pub const CATEGORIES: [&str; 5] = [
    "Benefits",
    "Legal",
    "Internal Culture",
    "Technical/IT",
    "General",
];

pub const SCHEMA_NAME: &str = "policy_answer";

pub fn build_system_instruction(context: &str) -> String {
    let categories = CATEGORIES
        .iter()
        .map(|c| format!("\"{}\"", c))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "You are an HR Onboarding Assistant. Your goal is to answer employee queries using ONLY the provided document context.\n\
         \n\
         CRITICAL RULES:\n\
         1. Answer only based on the provided documents. If the answer is not in the documents, say \"{refusal}\"\n\
         2. Provide specific citations or snippets from the documents to back your claims.\n\
         3. Categorize the query into one of: {categories}.\n\
         4. Return your response in JSON format.\n\
         \n\
         Context:\n\
         {context}",
        refusal = REFUSAL_MESSAGE,
        categories = categories,
        context = context,
    )
}

/// `{answer: string, citations: string[], category: string}`, all required.
pub fn answer_schema() -> SchemaType {
    SchemaType::Object(vec![
        SchemaProperty::required("answer", SchemaType::String),
        SchemaProperty::required("citations", SchemaType::Array(Box::new(SchemaType::String)))
            .with_description("Relevant snippets or direct quotes from the provided context."),
        SchemaProperty::required("category", SchemaType::String),
    ])
}
