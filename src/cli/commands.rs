//! Command handlers. Each writes its human-readable result to `out`.

use anyhow::{bail, Context, Result};
use std::io::Write;
use std::path::Path;
use tokio_util::sync::CancellationToken;

use ap_app::usecases::ConnectionReport;
use ap_app::ProjectRepository;
use ap_core::pipeline::{RunReport, RunState};
use ap_core::project::{KeywordFormat, ProjectDraft, ProjectDraftFile, ProjectRecord};
use ap_core::{ProjectId, SecretString};

use super::progress::ConsoleProgressSink;
use super::Commands;
use crate::bootstrap::AppRuntime;

const MASK: &str = "********";

pub async fn dispatch(
    runtime: &AppRuntime,
    command: Commands,
    cancel: &CancellationToken,
    out: &mut dyn Write,
) -> Result<()> {
    match command {
        Commands::List => run_list(runtime, out).await,
        Commands::Show { project } => run_show(runtime, &project, out).await,
        Commands::Add { file } => run_add(runtime, &file, out).await,
        Commands::Delete { project } => run_delete(runtime, &project, out).await,
        Commands::ImportKeywords {
            project,
            file,
            format,
            replace,
        } => {
            let format = format
                .map(KeywordFormat::from)
                .unwrap_or_else(|| KeywordFormat::from_path(&file));
            run_import_keywords(runtime, &project, &file, format, replace, out).await
        }
        Commands::Run { project } => {
            let report = run_project(runtime, &project, cancel, out).await?;
            if report.state == RunState::Failed {
                bail!(
                    "run failed: {}",
                    report.error.as_deref().unwrap_or("unknown error")
                );
            }
            Ok(())
        }
        Commands::Test { project } => {
            let report = run_test(runtime, &project, out).await?;
            if !report.all_ok() {
                bail!("connection test failed");
            }
            Ok(())
        }
        Commands::Backup => run_backup(runtime, out).await,
        Commands::RotateKey => run_rotate_key(runtime, out).await,
    }
}

/// Looks a project up by id first, then by name.
pub async fn resolve_project(repo: &ProjectRepository, key: &str) -> Result<ProjectRecord> {
    if let Some(record) = repo.get(&ProjectId::from(key)).await {
        return Ok(record);
    }
    match repo.get_by_name(key).await {
        Some(record) => Ok(record),
        None => bail!("no project with id or name '{key}'"),
    }
}

pub async fn run_list(runtime: &AppRuntime, out: &mut dyn Write) -> Result<()> {
    let projects = runtime.repo().list().await;
    if projects.is_empty() {
        writeln!(out, "No projects yet. Add one with `autopress add --file <draft.json>`.")?;
        return Ok(());
    }

    for p in &projects {
        writeln!(
            out,
            "{}  {}  {}  {} keywords  {}",
            p.id,
            p.name,
            p.site_url,
            p.keyword_count(),
            p.post_status
        )?;
    }
    Ok(())
}

pub async fn run_show(runtime: &AppRuntime, key: &str, out: &mut dyn Write) -> Result<()> {
    let p = resolve_project(runtime.repo(), key).await?;

    writeln!(out, "id:              {}", p.id)?;
    writeln!(out, "name:            {}", p.name)?;
    writeln!(out, "site:            {}", p.site_url)?;
    writeln!(out, "username:        {}", p.username)?;
    writeln!(out, "app password:    {}", mask(&p.app_password))?;
    writeln!(out, "category:        {}", p.category_id)?;
    writeln!(out, "post status:     {}", p.post_status)?;
    writeln!(out, "generator:       {}", p.generator_kind.as_str())?;
    writeln!(out, "generator key:   {}", mask(&p.generator_api_key))?;
    writeln!(out, "created:         {}", p.created_at.to_rfc3339())?;
    writeln!(out, "updated:         {}", p.updated_at.to_rfc3339())?;
    writeln!(out, "prompt template:")?;
    for line in p.prompt_template.lines() {
        writeln!(out, "  {line}")?;
    }
    writeln!(out, "keywords ({}):", p.keyword_count())?;
    for (i, keyword) in p.keywords.iter().enumerate() {
        writeln!(out, "  {:>3}. {keyword}", i + 1)?;
    }
    Ok(())
}

fn mask(secret: &SecretString) -> &'static str {
    if secret.is_empty() {
        "(empty)"
    } else {
        MASK
    }
}

pub async fn run_add(runtime: &AppRuntime, file: &Path, out: &mut dyn Write) -> Result<()> {
    let content = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read draft file: {}", file.display()))?;
    let draft: ProjectDraftFile = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse draft file: {}", file.display()))?;

    let record = runtime.repo().create(ProjectDraft::from(draft)).await?;
    writeln!(
        out,
        "Created project '{}' ({}) with {} keywords",
        record.name,
        record.id,
        record.keyword_count()
    )?;
    Ok(())
}

pub async fn run_delete(runtime: &AppRuntime, key: &str, out: &mut dyn Write) -> Result<()> {
    let project = resolve_project(runtime.repo(), key).await?;
    runtime.repo().delete(&project.id).await?;
    writeln!(out, "Deleted project '{}' ({})", project.name, project.id)?;
    Ok(())
}

pub async fn run_import_keywords(
    runtime: &AppRuntime,
    key: &str,
    file: &Path,
    format: KeywordFormat,
    replace: bool,
    out: &mut dyn Write,
) -> Result<()> {
    let project = resolve_project(runtime.repo(), key).await?;
    let text = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read keyword file: {}", file.display()))?;

    let count = runtime
        .usecases()
        .import_keywords()
        .execute(&project.id, &text, format, replace)
        .await?;

    let verb = if replace { "Replaced keywords with" } else { "Added" };
    writeln!(out, "{verb} {count} keywords on '{}'", project.name)?;
    Ok(())
}

pub async fn run_project(
    runtime: &AppRuntime,
    key: &str,
    cancel: &CancellationToken,
    out: &mut dyn Write,
) -> Result<RunReport> {
    let project = resolve_project(runtime.repo(), key).await?;
    writeln!(
        out,
        "Running '{}': {} keywords",
        project.name,
        project.keyword_count()
    )?;
    out.flush()?;

    let sink = ConsoleProgressSink::new();
    let report = runtime
        .usecases()
        .run_project()
        .execute(&project.id, &sink, cancel)
        .await?;

    write_run_summary(&report, out)?;
    Ok(report)
}

pub fn write_run_summary(report: &RunReport, out: &mut dyn Write) -> Result<()> {
    let s = &report.summary;
    match report.state {
        RunState::Completed => writeln!(
            out,
            "Completed: {} published, {} failed, {} total",
            s.succeeded, s.failed, s.total
        )?,
        RunState::Cancelled => writeln!(
            out,
            "Cancelled after {} of {} keywords: {} published, {} failed",
            s.attempted(),
            s.total,
            s.succeeded,
            s.failed
        )?,
        RunState::Failed => writeln!(
            out,
            "Failed before the first keyword: {}",
            report.error.as_deref().unwrap_or("unknown error")
        )?,
        other => writeln!(out, "Run ended in state {other}")?,
    }
    Ok(())
}

pub async fn run_test(
    runtime: &AppRuntime,
    key: &str,
    out: &mut dyn Write,
) -> Result<ConnectionReport> {
    let project = resolve_project(runtime.repo(), key).await?;
    let report = runtime
        .usecases()
        .test_connections()
        .execute(&project.id)
        .await?;

    write_connection_report(&report, out)?;
    Ok(report)
}

pub fn write_connection_report(report: &ConnectionReport, out: &mut dyn Write) -> Result<()> {
    for (name, check) in [("generator", &report.generator), ("publisher", &report.publisher)] {
        match &check.error {
            None => writeln!(out, "{name}: ok")?,
            Some(err) => writeln!(out, "{name}: FAILED ({err})")?,
        }
    }
    if !report.categories.is_empty() {
        writeln!(out, "categories:")?;
        for c in &report.categories {
            writeln!(out, "  {:>5}  {}", c.id, c.name)?;
        }
    }
    Ok(())
}

pub async fn run_backup(runtime: &AppRuntime, out: &mut dyn Write) -> Result<()> {
    let path = runtime.repo().backup().await?;
    writeln!(out, "Backup written to {}", path.display())?;
    Ok(())
}

pub async fn run_rotate_key(runtime: &AppRuntime, out: &mut dyn Write) -> Result<()> {
    runtime.usecases().rotate_encryption_key().execute().await?;
    writeln!(out, "Encryption key rotated")?;
    Ok(())
}
