//! The `publish` command.

use std::path::PathBuf;

use clap::{Args, ValueEnum};

use mdconf_confluence::{
    ConfluenceClient, PublishOptions, Publisher, api_url_from_org, simulate,
};
use mdconf_transform::{EditorVersion, SourceFormat};

use crate::config::{CliSettings, Config};
use crate::error::CliError;
use crate::output::Output;

/// Markdown dialect the source file was written for.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum MarkdownSource {
    /// GitHub-style heading anchors.
    #[default]
    Default,
    /// Bitbucket-style `#markdown-header-` anchors.
    Bitbucket,
}

impl From<MarkdownSource> for SourceFormat {
    fn from(source: MarkdownSource) -> Self {
        match source {
            MarkdownSource::Default => SourceFormat::Default,
            MarkdownSource::Bitbucket => SourceFormat::Bitbucket,
        }
    }
}

/// Publish a markdown file to a Confluence page.
#[derive(Args)]
pub(crate) struct PublishArgs {
    /// Markdown file to publish.
    markdown_file: PathBuf,

    /// Confluence space key to publish into.
    space_key: String,

    /// Confluence username (usually an email address).
    #[arg(short, long, env = "CONFLUENCE_USERNAME")]
    username: Option<String>,

    /// Confluence API key.
    #[arg(short = 'p', long, env = "CONFLUENCE_API_KEY")]
    apikey: Option<String>,

    /// Confluence organization name or fully qualified domain.
    #[arg(short, long, env = "CONFLUENCE_ORGNAME")]
    orgname: Option<String>,

    /// Title of an existing page to file this page under.
    #[arg(short, long)]
    ancestor: Option<String>,

    /// Page title; derived from the first level-1 heading when omitted.
    #[arg(long)]
    title: Option<String>,

    /// Extra file to attach to the page (repeatable).
    #[arg(short = 't', long = "attachment", value_name = "FILE")]
    attachments: Vec<PathBuf>,

    /// Label to add to the page (repeatable).
    #[arg(long = "label", value_name = "LABEL")]
    labels: Vec<String>,

    /// Content property to set, as key=value (repeatable).
    #[arg(long = "property", value_name = "KEY=VALUE", value_parser = parse_property)]
    properties: Vec<(String, String)>,

    /// Prepend a table of contents to the page.
    #[arg(short, long)]
    contents: bool,

    /// Strip emoji characters from the page body.
    #[arg(long)]
    remove_emojis: bool,

    /// Markdown dialect of the source file.
    #[arg(long = "markdownsrc", value_enum, default_value_t)]
    markdown_source: MarkdownSource,

    /// Confluence editor version to target.
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u8).range(1..=2))]
    editor_version: u8,

    /// Convert locally and print the result without contacting Confluence.
    #[arg(short, long)]
    simulate: bool,

    /// Delete the page instead of publishing it.
    #[arg(short, long)]
    delete: bool,

    /// Connect to Confluence over plain HTTP.
    #[arg(short = 'n', long)]
    no_ssl: bool,

    /// Path to a config file (default: mdconf.toml in this or a parent directory).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl PublishArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let options = self.publish_options();

        if self.simulate {
            let markdown = std::fs::read_to_string(&self.markdown_file)?;
            let document = simulate(&markdown, &options)?;
            output.highlight("Simulate mode: no changes sent to Confluence");
            if let Some(title) = &document.title {
                output.info(&format!("Title: {title}"));
            }
            output.info(&document.body);
            return Ok(());
        }

        let settings = CliSettings {
            username: self.username.clone(),
            api_key: self.apikey.clone(),
            org_name: self.orgname.clone(),
        };
        let config = Config::load(self.config.as_deref(), Some(&settings))?;
        let credentials = config.require_credentials()?;

        let api_url = api_url_from_org(&credentials.org_name, !self.no_ssl);
        let client = ConfluenceClient::new(
            &api_url,
            &credentials.username,
            &credentials.api_key,
            &self.space_key,
        );
        let publisher = Publisher::new(client, options);

        if self.delete {
            if publisher.delete(&self.markdown_file)? {
                output.success("Page deleted");
            } else {
                output.warning("Page not found, nothing deleted");
            }
            return Ok(());
        }

        let outcome = publisher.publish(&self.markdown_file)?;
        output.success(&format!("Published page {}", outcome.page_id));
        output.info(&outcome.url);
        Ok(())
    }

    fn publish_options(&self) -> PublishOptions {
        PublishOptions {
            title: self.title.clone(),
            ancestor: self.ancestor.clone(),
            source_format: self.markdown_source.into(),
            editor: self.editor(),
            strip_emojis: self.remove_emojis,
            prepend_contents: self.contents,
            labels: self.labels.clone(),
            properties: self.properties.clone(),
            attachments: self.attachments.clone(),
        }
    }

    fn editor(&self) -> EditorVersion {
        match self.editor_version {
            1 => EditorVersion::V1,
            _ => EditorVersion::V2,
        }
    }
}

/// Parse a `key=value` property argument.
fn parse_property(value: &str) -> Result<(String, String), String> {
    match value.split_once('=') {
        Some((key, val)) if !key.is_empty() => Ok((key.to_string(), val.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{value}'")),
    }
}
