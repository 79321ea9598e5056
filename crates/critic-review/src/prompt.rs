use critic_core::LoadedFile;

/// Phrase the model uses for a section with nothing worth reporting.
pub const NO_ISSUES: &str = "No issues found.";

const SYSTEM_PROMPT: &str = "\
You are an experienced code reviewer leaving a comment on a pull request. \
You are given the full content of one changed file.

Answer in Markdown using exactly these four sections, in this order:

### Code quality & readability
### Potential bugs & security
### Performance
### Best practices

Rules:
- Keep each section to a few short bullet points
- Point at concrete functions, lines, or identifiers from the file
- Only raise issues that matter; do not nitpick formatting
- If a section has nothing material, write exactly: No issues found.
- Do not repeat the code back and do not add an introduction or closing remarks";

/// Build the system instruction for the review call.
///
/// # Examples
///
/// ```
/// use critic_review::prompt::{build_system_prompt, NO_ISSUES};
///
/// let prompt = build_system_prompt();
/// assert!(prompt.contains("Potential bugs & security"));
/// assert!(prompt.contains(NO_ISSUES));
/// ```
pub fn build_system_prompt() -> String {
    SYSTEM_PROMPT.to_string()
}

/// Build the user prompt embedding the file path and its content.
///
/// A truncated file is announced so the reviewer does not flag the cut-off
/// end as a bug.
///
/// # Examples
///
/// ```
/// use critic_core::LoadedFile;
/// use critic_review::prompt::build_review_prompt;
/// use std::path::PathBuf;
///
/// let file = LoadedFile {
///     path: PathBuf::from("src/app.ts"),
///     content: b"let x = 1;".to_vec(),
///     truncated: false,
///     size: 10,
/// };
/// let prompt = build_review_prompt(&file);
/// assert!(prompt.contains("src/app.ts"));
/// assert!(prompt.contains("let x = 1;"));
/// ```
pub fn build_review_prompt(file: &LoadedFile) -> String {
    let path = file.path.display();
    let lang = fence_language(&file.path.to_string_lossy());
    let mut prompt = format!("Review the following file: `{path}`\n\n");
    if file.truncated {
        prompt.push_str(&format!(
            "Note: the file is {} bytes; only the first {} bytes are shown. \
             Do not report the cut-off ending as a problem.\n\n",
            file.size,
            file.content.len()
        ));
    }
    prompt.push_str(&format!("```{lang}\n{}\n```\n", file.text()));
    prompt
}

fn fence_language(path: &str) -> &'static str {
    let ext = path.rsplit_once('.').map(|(_, e)| e).unwrap_or_default();
    match ext {
        "py" => "python",
        "js" | "jsx" => "javascript",
        "ts" | "tsx" => "typescript",
        "sql" => "sql",
        "json" => "json",
        "css" => "css",
        "scss" => "scss",
        _ => "",
    }
}
