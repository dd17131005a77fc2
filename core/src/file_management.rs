//! Files and folders stored against a project.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::client::{path_id, require, AgaveClient, Scope};
use crate::error::Result;
use crate::transport::Transport;
use crate::types::{File, Folder, ListBody};

pub struct FileManagement<'c, T> {
    client: &'c AgaveClient<T>,
    include_source_fields: Vec<String>,
}

impl<'c, T: Transport> FileManagement<'c, T> {
    pub(crate) fn new(client: &'c AgaveClient<T>) -> Self {
        Self {
            client,
            include_source_fields: Vec::new(),
        }
    }

    pub fn include_source_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include_source_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    fn scope<'a>(&'a self, account_token: &'a str, project_id: Option<&'a str>) -> Scope<'a> {
        Scope {
            account_token,
            project_id,
            include_source_fields: &self.include_source_fields,
        }
    }

    pub fn file(&self, file_id: &str, account_token: &str) -> Result<File> {
        let file_id = path_id("file id", file_id)?;
        self.client
            .fetch_one(&format!("/files/{file_id}"), &self.scope(account_token, None))
    }

    /// Files directly inside `folder_id`.
    pub fn files(&self, folder_id: &str, account_token: &str) -> Result<Vec<File>> {
        let folder_id = path_id("folder id", folder_id)?;
        let body: ListBody<File> = self
            .client
            .fetch_one(&format!("/folders/{folder_id}/files"), &self.scope(account_token, None))?;
        Ok(body.into_page().data)
    }

    pub fn folder(&self, folder_id: &str, account_token: &str) -> Result<Folder> {
        let folder_id = path_id("folder id", folder_id)?;
        self.client
            .fetch_one(&format!("/folders/{folder_id}"), &self.scope(account_token, None))
    }

    pub fn root_folder(&self, project_id: &str, account_token: &str) -> Result<Folder> {
        let project_id = require("project id", project_id)?;
        self.client
            .fetch_one("/root-folder", &self.scope(account_token, Some(project_id)))
    }

    /// Fetch a folder (the project root when `folder_id` is `None`) and
    /// expand every subfolder beneath it.
    ///
    /// Each folder is requested at most once. A subfolder that points back at
    /// a folder already on the tree is left unexpanded.
    pub fn file_tree(&self, project_id: &str, folder_id: Option<&str>, account_token: &str) -> Result<Folder> {
        let root = match folder_id {
            Some(folder_id) => self.folder(folder_id, account_token)?,
            None => self.root_folder(project_id, account_token)?,
        };
        let mut visited = HashSet::new();
        visited.insert(root.id.clone());
        self.expand(root, account_token, &mut visited)
    }

    fn expand(&self, mut folder: Folder, account_token: &str, visited: &mut HashSet<String>) -> Result<Folder> {
        let children = std::mem::take(&mut folder.folders);
        for child in children {
            if !visited.insert(child.id.clone()) {
                warn!(folder_id = %child.id, "folder already expanded, skipping");
                folder.folders.push(child);
                continue;
            }
            debug!(folder_id = %child.id, parent_id = %folder.id, "expanding folder");
            let fetched = self.folder(&child.id, account_token)?;
            folder.folders.push(self.expand(fetched, account_token, visited)?);
        }
        Ok(folder)
    }
}
