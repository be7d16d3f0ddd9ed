#[cfg(test)]
#[path = "ui_test.rs"]
mod tests;

use std::path;

use anyhow::Result;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Input;
use dialoguer::Select;
use tokio::fs;
use tokio::sync::mpsc;
use tokio::task;
use yansi::Paint;

use crate::application::cli::ReviewArgs;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Action;
use crate::domain::models::CleanDocument;
use crate::domain::models::DocumentState;
use crate::domain::models::Event;
use crate::domain::models::Intent;
use crate::domain::models::SessionSnapshot;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuItem {
    Intent(Intent),
    Quit,
}

fn intent_label(intent: Intent, state: DocumentState) -> &'static str {
    match (intent, state) {
        (Intent::Submit, DocumentState::Idle) => return "Upload a document",
        (Intent::Submit, _) => return "Upload another document",
        (Intent::Accept, DocumentState::Failed) => return "Retry accepting suggestions",
        (Intent::Accept, _) => return "Accept all suggestions",
        (Intent::SubmitFeedback, _) => return "Provide feedback",
        (Intent::NavigateBack, _) => return "Back to upload",
        (Intent::RetryDownload, _) => return "Download again",
    }
}

/// Menu offered for a snapshot. Empty while a request is in flight.
pub fn menu(snapshot: &SessionSnapshot) -> Vec<MenuItem> {
    if snapshot.state.is_in_flight() {
        return vec![];
    }

    if snapshot.state == DocumentState::Accepted && !snapshot.allows(Intent::RetryDownload) {
        return vec![];
    }

    let mut items = snapshot
        .allowed_intents
        .iter()
        .map(|intent| return MenuItem::Intent(*intent))
        .collect::<Vec<MenuItem>>();
    items.push(MenuItem::Quit);

    return items;
}

fn menu_label(item: MenuItem, state: DocumentState) -> String {
    match item {
        MenuItem::Intent(intent) => return intent_label(intent, state).to_string(),
        MenuItem::Quit => return "Quit".to_string(),
    }
}

fn status_line(state: DocumentState) -> Option<&'static str> {
    match state {
        DocumentState::Uploading => return Some("Uploading document..."),
        DocumentState::Analyzing => return Some("Analyzing document..."),
        DocumentState::Accepting => return Some("Accepting suggestions..."),
        DocumentState::SubmittingFeedback => return Some("Sending feedback..."),
        _ => return None,
    }
}

pub fn render(snapshot: &SessionSnapshot) -> String {
    let mut lines = vec![];

    let title = if snapshot.file_name.is_empty() {
        "No document".to_string()
    } else {
        snapshot.file_name.to_string()
    };
    lines.push(format!(
        "{} {}",
        Paint::new(title).bold(),
        Paint::cyan(format!("[{}]", snapshot.state))
    ));

    if let Some(status) = status_line(snapshot.state) {
        lines.push(Paint::yellow(status).to_string());
    }

    if snapshot.state == DocumentState::Reviewing {
        if snapshot.suggestions.is_empty() {
            lines.push("No suggestions, the document looks good.".to_string());
        }

        for (idx, suggestion) in snapshot.suggestions.iter().enumerate() {
            lines.push(format!(
                "{:>3}. {}",
                idx + 1,
                Paint::red(&suggestion.original).strikethrough()
            ));
            lines.push(format!("     {}", Paint::green(&suggestion.suggestion)));
        }

        if let Some(redline_document_id) = &snapshot.redline_document_id {
            lines.push(format!("Redline document: {redline_document_id}"));
        }
    }

    if snapshot.state == DocumentState::Accepted {
        lines.push(Paint::green("Suggestions accepted.").to_string());
    }

    if let Some(err) = &snapshot.last_error {
        lines.push(Paint::red(format!("Error: {err}")).to_string());
    }

    return lines.join("\n");
}

/// Writes the clean document into `dir`, creating it if needed.
pub async fn save_document(dir: &path::Path, document: &CleanDocument) -> Result<path::PathBuf> {
    if !dir.exists() {
        fs::create_dir_all(dir).await?;
    }

    let file_path = dir.join(&document.file_name);
    fs::write(&file_path, &document.bytes).await?;

    return Ok(file_path);
}

async fn select(prompt: &str, labels: Vec<String>) -> Result<Option<usize>> {
    let prompt = prompt.to_string();
    return task::spawn_blocking(move || {
        return Select::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .default(0)
            .items(&labels)
            .interact_opt();
    })
    .await?
    .map_err(anyhow::Error::from);
}

async fn input(prompt: &str, allow_empty: bool) -> Result<String> {
    let prompt = prompt.to_string();
    return task::spawn_blocking(move || {
        return Input::<String>::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .allow_empty(allow_empty)
            .interact_text();
    })
    .await?
    .map_err(anyhow::Error::from);
}

async fn read_document(file: &path::Path) -> Result<Action> {
    let bytes = fs::read(file).await?;
    let file_name = file
        .file_name()
        .map(|name| return name.to_string_lossy().to_string())
        .unwrap_or_default();

    return Ok(Action::Submit(file_name, bytes));
}

async fn prompt_document() -> Result<Action> {
    loop {
        let file = input("Path to a Word document (.docx)", false).await?;
        match read_document(path::Path::new(file.trim())).await {
            Ok(action) => return Ok(action),
            Err(err) => {
                println!("{}", Paint::red(format!("Unable to read {file}: {err}")));
            }
        }
    }
}

/// Asks what to do next. `None` means the user wants to quit.
async fn prompt(snapshot: &SessionSnapshot) -> Result<Option<Action>> {
    let items = menu(snapshot);
    let labels = items
        .iter()
        .map(|item| return menu_label(*item, snapshot.state))
        .collect::<Vec<String>>();

    let idx = match select("What would you like to do?", labels).await? {
        Some(idx) => idx,
        None => return Ok(None),
    };

    match items[idx] {
        MenuItem::Quit => return Ok(None),
        MenuItem::Intent(Intent::Submit) => return Ok(Some(prompt_document().await?)),
        MenuItem::Intent(Intent::Accept) => return Ok(Some(Action::Accept())),
        MenuItem::Intent(Intent::SubmitFeedback) => {
            let text = input("Feedback for the reviewer", true).await?;
            return Ok(Some(Action::SubmitFeedback(text)));
        }
        MenuItem::Intent(Intent::NavigateBack) => return Ok(Some(Action::NavigateBack())),
        MenuItem::Intent(Intent::RetryDownload) => return Ok(Some(Action::RetryDownload())),
    }
}

pub async fn start(
    tx: mpsc::UnboundedSender<Action>,
    mut rx: mpsc::UnboundedReceiver<Event>,
    args: ReviewArgs,
) -> Result<()> {
    let download_dir = path::PathBuf::from(Config::get(ConfigKey::DownloadDir));

    if let Some(file) = &args.file {
        tx.send(read_document(file).await?)?;
    }

    // A file from the command line is submitted before the first prompt, so
    // the initial empty session is not worth asking about.
    let mut awaiting_submit = args.file.is_some();

    while let Some(event) = rx.recv().await {
        match event {
            Event::SessionUpdated(snapshot) => {
                if awaiting_submit
                    && snapshot.state == DocumentState::Idle
                    && snapshot.last_error.is_none()
                {
                    continue;
                }
                awaiting_submit = false;

                println!("\n{}", render(&snapshot));
                if menu(&snapshot).is_empty() {
                    continue;
                }

                match prompt(&snapshot).await? {
                    Some(action) => tx.send(action)?,
                    None => break,
                }
            }
            Event::DocumentReady(document) => {
                let file_path = save_document(&download_dir, &document).await?;
                println!(
                    "{}",
                    Paint::green(format!("Saved clean document to {}", file_path.display()))
                );
            }
            Event::DownloadFailed(message) => {
                println!("{}", Paint::red(message));
            }
        }
    }

    return Ok(());
}
