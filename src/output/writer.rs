// src/output/writer.rs
//! Executes output operations by performing actual I/O.
//!
//! This module is the only place where file I/O operations occur,
//! keeping the rest of the codebase pure and testable.

use super::types::*;
use crate::error::CrawlError;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

/// Delivers the output plan, performing all I/O operations.
///
/// Failed operations are recorded in the report rather than stopping the
/// remaining ones.
pub fn deliver(plan: OutputPlan) -> OutputReport {
    let mut report = OutputReport::new();
    let start_time = Instant::now();

    log::info!(
        "Executing output plan with {} operations",
        plan.operations.len()
    );

    for operation in plan.operations {
        let op_start = Instant::now();
        match execute_operation(&operation) {
            Ok(bytes_written) => {
                let duration_ms = op_start.elapsed().as_millis() as u64;
                report = report.with_completed(CompletedOperation {
                    operation,
                    bytes_written,
                    duration_ms,
                });
            }
            Err(e) => {
                log::error!("Operation failed: {}", e);
                report = report.with_failed(FailedOperation {
                    operation,
                    error: e.to_string(),
                });
            }
        }
    }

    report.stats.total_duration_ms = start_time.elapsed().as_millis() as u64;

    log::info!(
        "Output plan execution complete: {} succeeded, {} failed in {}ms",
        report.stats.operations_completed,
        report.stats.operations_failed,
        report.stats.total_duration_ms
    );

    report
}

/// Executes a single output operation.
fn execute_operation(operation: &DeliveryTarget) -> Result<usize, CrawlError> {
    match operation {
        DeliveryTarget::WriteFile { path, content } => write_file(path, content),
        DeliveryTarget::CreateDirectory { path } => {
            create_directory(path)?;
            Ok(0)
        }
        DeliveryTarget::PrintToStdout { content } => {
            print_to_stdout(content)?;
            Ok(content.len())
        }
    }
}

/// Writes content to a file.
fn write_file(path: &Path, content: &str) -> Result<usize, CrawlError> {
    log::debug!("Writing {} bytes to {}", content.len(), path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;

    log::info!("Wrote file: {}", path.display());
    Ok(content.len())
}

/// Creates a directory.
fn create_directory(path: &Path) -> Result<(), CrawlError> {
    if path.exists() {
        if path.is_dir() {
            log::debug!("Directory already exists: {}", path.display());
            return Ok(());
        }
        return Err(CrawlError::Io(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            format!("Path exists but is not a directory: {}", path.display()),
        )));
    }

    fs::create_dir_all(path)?;
    log::info!("Created directory: {}", path.display());
    Ok(())
}

/// Prints content to stdout.
fn print_to_stdout(content: &str) -> Result<(), CrawlError> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(content.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_writes_files_and_directories() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("docs");
        let plan = OutputPlan::new()
            .with_operation(DeliveryTarget::CreateDirectory { path: dir.clone() })
            .with_operation(DeliveryTarget::WriteFile {
                path: dir.join("doc_a.md"),
                content: "hello".to_string(),
            });

        let report = deliver(plan);
        assert!(report.is_success());
        assert_eq!(report.stats.bytes_written, 5);
        assert_eq!(fs::read_to_string(dir.join("doc_a.md")).unwrap(), "hello");
        assert_eq!(report.written_files(), vec![dir.join("doc_a.md").as_path()]);
    }

    #[test]
    fn test_failures_are_collected() {
        let temp = tempfile::tempdir().unwrap();
        let blocker: PathBuf = temp.path().join("not-a-dir");
        fs::write(&blocker, "x").unwrap();

        let plan = OutputPlan::new()
            .with_operation(DeliveryTarget::CreateDirectory {
                path: blocker.clone(),
            })
            .with_operation(DeliveryTarget::WriteFile {
                path: temp.path().join("ok.md"),
                content: "ok".to_string(),
            });

        let report = deliver(plan);
        assert!(!report.is_success());
        assert_eq!(report.stats.operations_failed, 1);
        assert_eq!(report.stats.operations_completed, 1);
    }
}
