use std::path::PathBuf;

use colored::Colorize;
use log::{info, warn};
use repopilot_core::attachments::{encode_data_uri, mime_from_extension};
use repopilot_core::generate::{
    build_prompt, fallback_completion, split_response, AttachmentRef, GenerationRequest,
    GenerationResult, PromptInput, SplitContext, INDEX_FILE, README_FILE, SYSTEM_MESSAGE,
};
use tempfile::TempDir;

use crate::prelude::{println, *};

pub mod attachments;
pub mod completion;

pub use attachments::{decode_attachments, summarize_attachments};
pub use completion::{AiPipeClient, CompletionApi, CompletionConfig, CompletionError};

/// Inputs describing what to generate, shared by `generate` and `deploy`.
#[derive(Debug, Clone, clap::Args)]
pub struct RequestArgs {
    /// Natural-language description of the app
    #[arg(long, required_unless_present = "request")]
    pub brief: Option<String>,

    /// Evaluation check the app must satisfy (repeatable)
    #[arg(long = "check")]
    pub checks: Vec<String>,

    /// Generation round: 1 for the initial build, 2 for a revision
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub round: u32,

    /// README of the previous round, used when --round is 2
    #[arg(long)]
    pub previous_readme: Option<PathBuf>,

    /// Local file sent as an inline attachment (repeatable)
    #[arg(long = "attachment")]
    pub attachments: Vec<PathBuf>,

    /// JSON file holding a complete generation request
    #[arg(long, conflicts_with_all = ["brief", "checks", "attachments", "previous_readme"])]
    pub request: Option<PathBuf>,

    /// Model used for the completion call
    #[arg(long, env = "REPOPILOT_MODEL")]
    pub model: Option<String>,
}

/// Options for `generate`
#[derive(Debug, clap::Args)]
pub struct GenerateOptions {
    #[clap(flatten)]
    pub request: RequestArgs,

    /// Directory to write index.html and README.md into
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Read a local file into a data-URI attachment named after the file.
async fn attachment_from_file(path: &std::path::Path) -> Result<AttachmentRef> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| eyre!("{} has no file name", path.display()))?;
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| f!("Failed to read attachment {}", path.display()))?;

    Ok(AttachmentRef {
        url: encode_data_uri(mime_from_extension(&name), &bytes),
        name,
    })
}

impl RequestArgs {
    /// Build the request from a JSON file or from the individual flags.
    pub async fn load(&self) -> Result<GenerationRequest> {
        if let Some(path) = &self.request {
            let raw = tokio::fs::read_to_string(path)
                .await
                .with_context(|| f!("Failed to read request file {}", path.display()))?;
            let mut request: GenerationRequest = serde_json::from_str(&raw)
                .with_context(|| f!("Invalid generation request in {}", path.display()))?;
            if request.round < 1 {
                return Err(eyre!(
                    "Invalid generation request in {}: round must be at least 1",
                    path.display()
                ));
            }
            // --round is only honoured when the file leaves it at the default
            if request.round == 1 {
                request.round = self.round;
            }
            return Ok(request);
        }

        let brief = self
            .brief
            .clone()
            .ok_or_eyre("--brief is required unless --request is given")?;

        let previous_readme = match &self.previous_readme {
            Some(path) => Some(
                tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| f!("Failed to read {}", path.display()))?,
            ),
            None => None,
        };

        let mut attachments = Vec::with_capacity(self.attachments.len());
        for path in &self.attachments {
            attachments.push(attachment_from_file(path).await?);
        }

        Ok(GenerationRequest {
            brief,
            attachments,
            checks: self.checks.clone(),
            round: self.round,
            previous_readme,
        })
    }
}

/// A generation result together with the scratch directory its attachments live in.
///
/// Every `local_path` in the result points inside the scratch directory, which
/// is removed when this value is dropped.
#[derive(Debug)]
pub struct Generation {
    pub result: GenerationResult,
    scratch: TempDir,
}

impl Generation {
    pub fn scratch_dir(&self) -> &std::path::Path {
        self.scratch.path()
    }
}

/// Generate an app from `request`.
///
/// Attachments are decoded into a fresh scratch directory and summarized into
/// the prompt. The completion service is called exactly once. When it fails,
/// deterministic fallback content is used instead and `result.fallback` is set.
pub async fn generate_app_code<C: CompletionApi + ?Sized>(
    completion: &C,
    request: &GenerationRequest,
) -> Result<Generation> {
    let scratch = tempfile::Builder::new()
        .prefix("repopilot-attachments-")
        .tempdir()
        .context("Failed to create attachment scratch directory")?;

    let attachments = decode_attachments(&request.attachments, scratch.path()).await;
    let summary = summarize_attachments(&attachments).await;

    let prompt = build_prompt(&PromptInput {
        brief: &request.brief,
        round: request.round,
        previous_readme: request.revision_context(),
        attachments_summary: &summary,
        checks: &request.checks,
    });

    let (text, fallback) = match completion.complete(SYSTEM_MESSAGE, &prompt).await {
        Ok(text) => {
            info!("Generated app code for round {}", request.round);
            (text, false)
        }
        Err(e) => {
            warn!("Completion failed, using fallback: {e}");
            (
                fallback_completion(&request.brief, &request.checks, &summary, request.round),
                true,
            )
        }
    };

    let files = split_response(
        &text,
        &SplitContext {
            brief: &request.brief,
            checks: &request.checks,
            attachments_meta: &summary,
            round: request.round,
        },
    );

    Ok(Generation {
        result: GenerationResult::new(files, attachments, fallback),
        scratch,
    })
}

/// Handle `generate`.
pub async fn run(options: GenerateOptions, global: crate::Global) -> Result<()> {
    let request = options.request.load().await?;
    let config = CompletionConfig::from_env().with_model(options.request.model.clone());

    if global.verbose {
        println!("Completion endpoint: {}", config.base_url);
        println!("Model: {}", config.model);
        println!();
    }

    if config.token.is_none() {
        warn!("AIPIPE_TOKEN is not set, the fallback app will be generated");
    }

    let client = AiPipeClient::new(config)?;
    let generation = generate_app_code(&client, &request).await?;
    let result = &generation.result;

    if let Some(dir) = &options.out_dir {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| f!("Failed to create {}", dir.display()))?;
        for (name, content) in &result.files {
            let path = dir.join(name);
            tokio::fs::write(&path, content)
                .await
                .with_context(|| f!("Failed to write {}", path.display()))?;
        }
    }

    if options.json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    if result.fallback {
        println!("{}", "Completion failed, fallback content generated".yellow().bold());
        println!();
    }

    match &options.out_dir {
        Some(dir) => {
            for name in [INDEX_FILE, README_FILE] {
                println!("{} {}", "Wrote".green().bold(), dir.join(name).display());
            }
        }
        None => {
            println!("{}", format!("==> {INDEX_FILE}").cyan().bold());
            println!("{}", result.index_html());
            println!();
            println!("{}", format!("==> {README_FILE}").cyan().bold());
            println!("{}", result.readme());
        }
    }

    Ok(())
}
