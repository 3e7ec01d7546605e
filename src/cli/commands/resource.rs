use clap::Subcommand;

use crate::cli::utils::{output_envelope, read_stdin_json};
use crate::cli::OutputFormat;
use crate::client::{BuildProClient, ListParams};
use crate::database::models::{CreateCustomer, CreateFile, CreateProject, CreateTask};
use crate::database::models::{UpdateCustomer, UpdateFile, UpdateProject, UpdateTask};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Customers,
    Projects,
    Tasks,
    Files,
}

#[derive(Subcommand)]
pub enum ResourceCommands {
    #[command(about = "List records with search, filters, sort and paging")]
    List {
        #[arg(long, help = "Case-insensitive search term")]
        search: Option<String>,
        #[arg(long, help = "Field to sort by")]
        sort_by: Option<String>,
        #[arg(long, help = "Sort order: asc or desc")]
        sort_order: Option<String>,
        #[arg(long, help = "Page number (starts at 1)")]
        page: Option<u64>,
        #[arg(long, help = "Records per page")]
        limit: Option<u64>,
        #[arg(long = "filter", value_parser = parse_key_value, help = "Exact-match filter as key=value (repeatable)")]
        filters: Vec<(String, String)>,
    },

    #[command(about = "Show one record")]
    Get {
        #[arg(help = "Record ID")]
        id: String,
    },

    #[command(about = "Create a record from JSON on stdin")]
    Create,

    #[command(about = "Update a record from JSON on stdin (only fields present are changed)")]
    Update {
        #[arg(help = "Record ID")]
        id: String,
    },

    #[command(about = "Delete a record")]
    Delete {
        #[arg(help = "Record ID")]
        id: String,
    },
}

pub fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim().to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got `{}`", raw)),
    }
}

pub fn list_params(
    search: Option<String>,
    sort_by: Option<String>,
    sort_order: Option<String>,
    page: Option<u64>,
    limit: Option<u64>,
    filters: Vec<(String, String)>,
) -> ListParams {
    let mut params = ListParams::new();
    if let Some(search) = search {
        params = params.search(&search);
    }
    if let Some(sort_by) = sort_by {
        params = params.param("sortBy", sort_by);
    }
    if let Some(sort_order) = sort_order {
        params = params.param("sortOrder", sort_order);
    }
    if let Some(page) = page {
        params = params.page(page);
    }
    if let Some(limit) = limit {
        params = params.limit(limit);
    }
    for (key, value) in filters {
        params = params.param(&key, value);
    }
    params
}

pub async fn handle(
    client: &BuildProClient,
    resource: Resource,
    cmd: ResourceCommands,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let out = &output_format;
    match cmd {
        ResourceCommands::List { search, sort_by, sort_order, page, limit, filters } => {
            let params = list_params(search, sort_by, sort_order, page, limit, filters);
            match resource {
                Resource::Customers => output_envelope(out, &client.get_customers(&params).await, "Customers"),
                Resource::Projects => output_envelope(out, &client.get_projects(&params).await, "Projects"),
                Resource::Tasks => output_envelope(out, &client.get_tasks(&params).await, "Tasks"),
                Resource::Files => output_envelope(out, &client.get_files(&params).await, "Files"),
            }
        }
        ResourceCommands::Get { id } => match resource {
            Resource::Customers => output_envelope(out, &client.get_customer(&id).await, "Customer"),
            Resource::Projects => output_envelope(out, &client.get_project(&id).await, "Project"),
            Resource::Tasks => output_envelope(out, &client.get_task(&id).await, "Task"),
            Resource::Files => output_envelope(out, &client.get_file(&id).await, "File"),
        },
        ResourceCommands::Create => match resource {
            Resource::Customers => {
                let input: CreateCustomer = read_stdin_json()?;
                output_envelope(out, &client.create_customer(&input).await, "Customer created")
            }
            Resource::Projects => {
                let input: CreateProject = read_stdin_json()?;
                output_envelope(out, &client.create_project(&input).await, "Project created")
            }
            Resource::Tasks => {
                let input: CreateTask = read_stdin_json()?;
                output_envelope(out, &client.create_task(&input).await, "Task created")
            }
            Resource::Files => {
                let input: CreateFile = read_stdin_json()?;
                output_envelope(out, &client.create_file(&input).await, "File created")
            }
        },
        ResourceCommands::Update { id } => match resource {
            Resource::Customers => {
                let input: UpdateCustomer = read_stdin_json()?;
                output_envelope(out, &client.update_customer(&id, &input).await, "Customer updated")
            }
            Resource::Projects => {
                let input: UpdateProject = read_stdin_json()?;
                output_envelope(out, &client.update_project(&id, &input).await, "Project updated")
            }
            Resource::Tasks => {
                let input: UpdateTask = read_stdin_json()?;
                output_envelope(out, &client.update_task(&id, &input).await, "Task updated")
            }
            Resource::Files => {
                let input: UpdateFile = read_stdin_json()?;
                output_envelope(out, &client.update_file(&id, &input).await, "File updated")
            }
        },
        ResourceCommands::Delete { id } => match resource {
            Resource::Customers => output_envelope(out, &client.delete_customer(&id).await, "Customer deleted"),
            Resource::Projects => output_envelope(out, &client.delete_project(&id).await, "Project deleted"),
            Resource::Tasks => output_envelope(out, &client.delete_task(&id).await, "Task deleted"),
            Resource::Files => output_envelope(out, &client.delete_file(&id).await, "File deleted"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_value_filters() {
        assert_eq!(parse_key_value("status=pending").unwrap(), ("status".into(), "pending".into()));
        assert_eq!(parse_key_value("customer=A=B").unwrap(), ("customer".into(), "A=B".into()));
        assert!(parse_key_value("status").is_err());
        assert!(parse_key_value("=x").is_err());
    }

    #[test]
    fn list_params_carry_filters() {
        let params = list_params(
            Some("villa".into()),
            None,
            Some("asc".into()),
            Some(2),
            None,
            vec![("projectType".into(), "Renovation".into())],
        );
        let pairs: Vec<(&str, &str)> = params.pairs().iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        assert_eq!(
            pairs,
            vec![("search", "villa"), ("sortOrder", "asc"), ("page", "2"), ("projectType", "Renovation")]
        );
    }
}
