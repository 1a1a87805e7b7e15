/// The instruction sent ahead of every question. The model is asked for bare SQL; the
/// extractor still tolerates reasoning blocks and prose because small models ignore this.
const INSTRUCTIONS: &str = "\
Convert this user question into a valid SQL query.
IMPORTANT: Only return the SQL query itself, without any explanation, tags, or additional text.
Do not include any text like '<think>' or any other non-SQL content.
The response should be a valid SQL query that can be executed directly.";

pub fn build_prompt(question: &str) -> String {
    format!("{INSTRUCTIONS}\n\nUser question: {question}\n\nSQL query:\n")
}
