use schemars::JsonSchema;
use semcheck_llm::Message;
use serde::Deserialize;

pub const GREP_SYSTEM_PROMPT: &str = "\
You generate a grep query that finds specific lines in a document. Express the \
query as a regular expression.
The user describes which parts of the document are needed in the <specifically> \
section. The rule name is given in the <rule_name> section and the rule \
description in the <description> section.
The <header> section holds the first characters of the document; use it as a \
hint about how this particular document is structured.
Respond ONLY with a JSON object with a single \"query\" key.";

/// Structured answer to the grep prompt.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct GrepQuery {
    /// Regular expression matched against each line of the document.
    pub query: String,
}

#[must_use]
pub fn grep_user_prompt(
    header: &str,
    specifically: &str,
    rule_name: &str,
    rule_description: &str,
) -> String {
    format!(
        "\n<header>{header}</header>\n\
         <specifically>{specifically}</specifically>\n\
         <rule_name>{rule_name}</rule_name>\n\
         <description>{rule_description}</description>\n"
    )
}

#[must_use]
pub fn grep_messages(
    header: &str,
    specifically: &str,
    rule_name: &str,
    rule_description: &str,
) -> Vec<Message> {
    vec![
        Message::system(GREP_SYSTEM_PROMPT),
        Message::user(grep_user_prompt(
            header,
            specifically,
            rule_name,
            rule_description,
        )),
    ]
}
