//! # Folder Traversal
//!
//! Depth-first, post-order walk of the folder tree below the configured root.
//! A folder is only processed (its projects, then itself) after every one of
//! its sub-folders has been completely processed.
//!
//! The walk uses an explicit stack of `Enter`/`Exit` frames:
//! - `Enter(folder)` lists the sub-folders, pushes `Exit(folder)` and then the
//!   sub-folders' `Enter` frames on top of it;
//! - `Exit(folder)` runs once everything above it has been popped, i.e. once
//!   the whole sub-tree is drained.
//!
//! Failing to list sub-folders aborts the run; every other failure is logged
//! and recorded.

use super::error::CleanupError;
use super::predicates::{folder_eligible, project_eligible};
use super::report::{ResourceKind, RunReport};
use super::retry::{retry, RetryPolicy};
use super::teardown::{teardown_folder, teardown_project};
use crate::config::CleanupConfig;
use crate::provider::{collect_pages, CloudProviders, Folder, Project, ProviderResult};
use chrono::{DateTime, Utc};
use tracing::{debug, error, info, info_span, warn, Instrument};

enum Frame {
    Enter(Folder),
    Exit(Folder),
}

/// Walks one folder tree and tears down what is eligible
pub struct Traversal<'a> {
    config: &'a CleanupConfig,
    providers: &'a CloudProviders,
    cutoff: DateTime<Utc>,
    root_name: String,
    root_parent: Option<String>,
}

impl std::fmt::Debug for Traversal<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Traversal")
            .field("root_name", &self.root_name)
            .field("root_parent", &self.root_parent)
            .field("cutoff", &self.cutoff)
            .finish_non_exhaustive()
    }
}

impl<'a> Traversal<'a> {
    pub fn new(
        config: &'a CleanupConfig,
        providers: &'a CloudProviders,
        cutoff: DateTime<Utc>,
    ) -> Self {
        Self {
            config,
            providers,
            cutoff,
            root_name: config.root_folder_name(),
            root_parent: None,
        }
    }

    /// Walk the tree below the configured root
    ///
    /// # Errors
    /// Returns [`CleanupError::FolderListing`] if any folder's sub-folders
    /// cannot be listed. Work done before the failure is kept in `report`.
    pub async fn run(&mut self, report: &mut RunReport) -> Result<(), CleanupError> {
        let root = self.resolve_root().await;
        info!(
            root = %self.root_name,
            root_parent = self.root_parent.as_deref().unwrap_or("unknown"),
            cutoff = %self.cutoff,
            "Starting folder traversal"
        );

        let mut stack = vec![Frame::Enter(root)];
        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Enter(folder) => {
                    let children = self.list_sub_folders(&folder).await?;
                    debug!(folder.id = %folder.id(), children = children.len(), "Entering folder");
                    stack.push(Frame::Exit(folder));
                    // Reversed so children are visited in listing order
                    stack.extend(children.into_iter().rev().map(Frame::Enter));
                }
                Frame::Exit(folder) => {
                    let span = info_span!("visit_folder", folder.id = %folder.id());
                    self.exit_folder(&folder, report).instrument(span).await;
                }
            }
        }
        Ok(())
    }

    /// Fetch the root so its parent can be protected
    ///
    /// If the lookup fails only the root itself is guarded.
    async fn resolve_root(&mut self) -> Folder {
        match self
            .providers
            .resource_manager
            .get_folder(&self.root_name)
            .await
        {
            Ok(root) => {
                self.root_parent = Some(root.parent.clone());
                root
            }
            Err(e) => {
                warn!(root = %self.root_name, error = %e, "Failed to get root folder, its parent cannot be resolved");
                Folder {
                    name: self.root_name.clone(),
                    parent: String::new(),
                    display_name: String::new(),
                    create_time: String::new(),
                }
            }
        }
    }

    async fn list_sub_folders(&self, folder: &Folder) -> Result<Vec<Folder>, CleanupError> {
        let resource_manager = self.providers.resource_manager.as_ref();
        let parent = folder.name.as_str();
        collect_pages(|token| async move {
            resource_manager.list_folders(parent, token.as_deref()).await
        })
        .await
        .map_err(|source| {
            error!(folder.id = %folder.id(), error = %source, "Failed to list sub-folders, aborting run");
            CleanupError::FolderListing {
                folder: folder.name.clone(),
                source,
            }
        })
    }

    /// Post-order step: own projects first, then the folder itself
    async fn exit_folder(&self, folder: &Folder, report: &mut RunReport) {
        // A failed listing only costs this folder's projects; the folder guard
        // still runs and the API refuses to delete a folder that is not empty.
        let projects = match self.list_projects(folder).await {
            Ok(projects) => {
                info!(count = projects.len(), "Listed projects");
                projects
            }
            Err(e) => {
                error!(error = %e, "Failed to list projects");
                report.record_failure(ResourceKind::Project, &folder.name, e);
                Vec::new()
            }
        };

        for project in &projects {
            if project_eligible(project, self.config, self.cutoff) {
                teardown_project(
                    self.providers,
                    project,
                    self.config.endpoint_settle_delay,
                    report,
                )
                .await;
            } else {
                debug!(
                    project.id = %project.project_id,
                    lifecycle_state = %project.lifecycle_state,
                    "Project not eligible"
                );
                report.record_skipped(ResourceKind::Project);
            }
        }

        if folder_eligible(
            folder,
            &self.root_name,
            self.root_parent.as_deref(),
            self.cutoff,
        ) {
            teardown_folder(self.providers, folder, report).await;
        } else {
            debug!("Folder not eligible");
            report.record_skipped(ResourceKind::Folder);
        }
    }

    /// All projects directly under `folder`, each page fetched with retries
    async fn list_projects(&self, folder: &Folder) -> ProviderResult<Vec<Project>> {
        let resource_manager = self.providers.resource_manager.as_ref();
        let filter = format!("parent.type:folder parent.id:{}", folder.id());
        let filter = filter.as_str();
        let policy = RetryPolicy::new(
            self.config.retry_max_attempts,
            self.config.retry_initial_delay,
        );

        collect_pages(|token| async move {
            retry(policy, || resource_manager.list_projects(filter, token.as_deref())).await
        })
        .await
    }
}
