//! Projects and the project-scoped records hanging off them.
//!
//! # Design
//! `ProjectManagement` is a short-lived view over an `AgaveClient`. Options
//! such as paging or `Include-Source-Data` are set on the view with builder
//! methods and apply to the calls made through it; the client itself never
//! changes. Account tokens and project ids are passed per call.
//!
//! RFIs, submittals, specification sections and drawings always need a
//! project id. Contacts and vendors are account-wide and accept one
//! optionally.

use crate::client::{path_id, require, AgaveClient, ListOptions, Scope};
use crate::error::Result;
use crate::transport::Transport;
use crate::types::{Contact, Drawing, Page, Project, Rfi, SpecificationSection, Submittal, Vendor};

pub struct ProjectManagement<'c, T> {
    client: &'c AgaveClient<T>,
    options: ListOptions,
    include_source_fields: Vec<String>,
}

impl<'c, T: Transport> ProjectManagement<'c, T> {
    pub(crate) fn new(client: &'c AgaveClient<T>) -> Self {
        Self {
            client,
            options: ListOptions::default(),
            include_source_fields: Vec::new(),
        }
    }

    /// Ask the API to include these raw source-system fields in responses.
    pub fn include_source_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include_source_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.options.page = page;
        self
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.options.per_page = per_page;
        self
    }

    fn scope<'a>(&'a self, account_token: &'a str, project_id: Option<&'a str>) -> Scope<'a> {
        Scope {
            account_token,
            project_id,
            include_source_fields: &self.include_source_fields,
        }
    }

    fn list<R: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        account_token: &str,
        project_id: Option<&str>,
    ) -> Result<Vec<R>> {
        let page: Page<R> = self
            .client
            .fetch_page(path, &self.scope(account_token, project_id), self.options)?;
        Ok(page.data)
    }

    fn get<R: serde::de::DeserializeOwned>(
        &self,
        collection: &str,
        what: &str,
        id: &str,
        account_token: &str,
        project_id: Option<&str>,
    ) -> Result<R> {
        let id = path_id(what, id)?;
        self.client
            .fetch_one(&format!("{collection}/{id}"), &self.scope(account_token, project_id))
    }

    /// Projects visible to the account, for the configured page.
    pub fn projects(&self, account_token: &str) -> Result<Vec<Project>> {
        self.list("/projects", account_token, None)
    }

    /// Like `projects`, but keeps the pagination metadata the API returned.
    pub fn projects_page(&self, account_token: &str) -> Result<Page<Project>> {
        self.client
            .fetch_page("/projects", &self.scope(account_token, None), self.options)
    }

    pub fn project(&self, project_id: &str, account_token: &str) -> Result<Project> {
        self.get("/projects", "project id", project_id, account_token, None)
    }

    pub fn rfis(&self, project_id: &str, account_token: &str) -> Result<Vec<Rfi>> {
        let project_id = require("project id", project_id)?;
        self.list("/rfis", account_token, Some(project_id))
    }

    pub fn rfi(&self, rfi_id: &str, project_id: &str, account_token: &str) -> Result<Rfi> {
        let project_id = require("project id", project_id)?;
        self.get("/rfis", "rfi id", rfi_id, account_token, Some(project_id))
    }

    pub fn submittals(&self, project_id: &str, account_token: &str) -> Result<Vec<Submittal>> {
        let project_id = require("project id", project_id)?;
        self.list("/submittals", account_token, Some(project_id))
    }

    pub fn submittal(&self, submittal_id: &str, project_id: &str, account_token: &str) -> Result<Submittal> {
        let project_id = require("project id", project_id)?;
        self.get("/submittals", "submittal id", submittal_id, account_token, Some(project_id))
    }

    pub fn specifications(&self, project_id: &str, account_token: &str) -> Result<Vec<SpecificationSection>> {
        let project_id = require("project id", project_id)?;
        self.list("/specification-sections", account_token, Some(project_id))
    }

    pub fn specification(
        &self,
        specification_id: &str,
        project_id: &str,
        account_token: &str,
    ) -> Result<SpecificationSection> {
        let project_id = require("project id", project_id)?;
        self.get(
            "/specification-sections",
            "specification id",
            specification_id,
            account_token,
            Some(project_id),
        )
    }

    pub fn drawings(&self, project_id: &str, account_token: &str) -> Result<Vec<Drawing>> {
        let project_id = require("project id", project_id)?;
        self.list("/drawings", account_token, Some(project_id))
    }

    pub fn drawing(&self, drawing_id: &str, project_id: &str, account_token: &str) -> Result<Drawing> {
        let project_id = require("project id", project_id)?;
        self.get("/drawings", "drawing id", drawing_id, account_token, Some(project_id))
    }

    pub fn contacts(&self, project_id: Option<&str>, account_token: &str) -> Result<Vec<Contact>> {
        self.list("/contacts", account_token, project_id)
    }

    pub fn contact(&self, contact_id: &str, project_id: Option<&str>, account_token: &str) -> Result<Contact> {
        self.get("/contacts", "contact id", contact_id, account_token, project_id)
    }

    pub fn vendors(&self, project_id: Option<&str>, account_token: &str) -> Result<Vec<Vendor>> {
        self.list("/vendors", account_token, project_id)
    }

    pub fn vendor(&self, vendor_id: &str, project_id: Option<&str>, account_token: &str) -> Result<Vendor> {
        self.get("/vendors", "vendor id", vendor_id, account_token, project_id)
    }
}
