//! Formatting search results as context for a language model.

use crate::item::SearchResult;

/// Render results as text blocks separated by blank lines.
///
/// Each block is the result text followed by one `KEY: value` line per
/// metadata entry, keys uppercased and sorted.
pub fn combined_results_string(results: &[SearchResult]) -> String {
    results
        .iter()
        .map(|result| {
            let mut entries: Vec<(&String, &String)> = result.metadata.iter().collect();
            entries.sort();
            let metadata = entries
                .into_iter()
                .map(|(key, value)| format!("{}: {value}", key.to_uppercase()))
                .collect::<Vec<_>>()
                .join("\n");
            format!("{}\n{metadata}", result.text)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// A question-answering prompt that asks for an answer with a `SOURCES`
/// section, grounded in `results`.
pub fn export_llm_prompt(query: &str, results: &[SearchResult]) -> String {
    let sources = combined_results_string(results);
    format!(
        "Given the following extracted parts of a long document and a question, \
         create a final answer with references (\"SOURCES\").\n\
         If you don't know the answer, just say that you don't know. \
         Don't try to make up an answer.\n\
         ALWAYS return a \"SOURCES\" part in your answer.\n\
         \n\
         QUESTION: {query}\n\
         =========\n\
         {sources}\n\
         =========\n\
         FINAL ANSWER:"
    )
}
