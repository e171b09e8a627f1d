//! Fixed instruction prompts and generation settings for summarization.

use crate::types::ContentPayload;

pub const TEXT_SUMMARY_PROMPT: &str = "\
Summarize the following document clearly and thoroughly.

1. START WITH A BRIEF OVERVIEW explaining the main objective, topic, or theme of the document.
2. FOLLOW WITH KEY DETAILS presented as a list using hyphens (-). IF THE DOCUMENT HAS SECTIONS (e.g., INTRODUCTION, ANALYSIS, CONCLUSION), REFLECT THAT STRUCTURE IN THE SUMMARY.
3. USE ALL CAPITAL LETTERS to emphasize important facts, names, figures, and key terms.
4. DO NOT USE ASTERISKS, BOLD MARKDOWN, OR DOUBLE ASTERISK FORMATTING FOR HEADINGS OR EMPHASIS. USE ALL CAPITAL LETTERS INSTEAD.
5. INCLUDE RELEVANT NAMES, DATES, LOCATIONS, STATISTICS, AND TERMINOLOGY EXACTLY AS STATED in the source when appropriate.
6. AVOID GENERALIZING. Include specific facts and supporting details that clarify the summary.
7. IF THERE ARE INSIGHTS, RECOMMENDATIONS, OR CONCLUSIONS, PLACE THEM UNDER A FINAL BULLET CALLED \"INSIGHTS\" or \"CONCLUSION\".
8. THE SUMMARY SHOULD STAND ALONE, even if the reader does not have access to the original file. Be thorough, concise, and preserve meaning.";

pub const BINARY_SUMMARY_PROMPT: &str = "\
Summarize the content of this document/image as clearly and thoroughly as possible.

1. START WITH a BRIEF PARAGRAPH that explains the overall purpose, topic, or focus of the document/image.
2. THEN, LIST THE MOST IMPORTANT POINTS using hyphens (-) instead of asterisks.
3. USE ALL CAPITAL LETTERS for emphasis when highlighting key data or important terms.
4. DO NOT USE ASTERISKS, BOLD MARKDOWN, OR DOUBLE ASTERISK FORMATTING FOR HEADINGS OR EMPHASIS. USE ALL CAPITAL LETTERS INSTEAD.
5. INCLUDE NUMERIC DATA, LABELS, NAMES, OR TITLES when available, instead of generalizing them.
6. DO NOT OMIT relevant information, especially metrics, labels, section headers, or details that provide context.
7. IF SECTIONS OR CATEGORIES are present, GROUP bullet points accordingly with subheadings for clarity.
8. WRITE AS IF THE READER HAS NOT SEEN THE ORIGINAL FILE and needs a complete but concise summary. Be precise, comprehensive, and maintain clarity.";

pub const TEMPERATURE: f32 = 0.2;
pub const TOP_P: f32 = 0.95;
pub const TOP_K: u32 = 64;
pub const MAX_OUTPUT_TOKENS: u32 = 800;
pub const RESPONSE_MIME_TYPE: &str = "text/plain";

pub const SAFETY_THRESHOLD: &str = "BLOCK_MEDIUM_AND_ABOVE";
pub const SAFETY_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

/// Which instruction prompt accompanies a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptVariant {
    /// Plain text files and text extracted from documents.
    Text,
    /// Images, PDFs, and presentations converted to PDF.
    Binary,
}

impl PromptVariant {
    pub fn for_payload(payload: &ContentPayload) -> Self {
        match payload {
            ContentPayload::Text(_) => PromptVariant::Text,
            ContentPayload::InlineBinary { .. } => PromptVariant::Binary,
        }
    }

    pub fn instructions(&self) -> &'static str {
        match self {
            PromptVariant::Text => TEXT_SUMMARY_PROMPT,
            PromptVariant::Binary => BINARY_SUMMARY_PROMPT,
        }
    }
}
