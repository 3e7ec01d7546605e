use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::api::{ApiResponse, ApiResult};
use crate::database::models::fixtures::{demo_customers, demo_projects};
use crate::database::models::{Customer, Project};
use crate::database::StoreError;
use crate::error::ApiError;
use crate::filter::{Condition, Filter};
use crate::state::AppState;

const SAMPLE_SIZE: u64 = 10;

/// Body of `POST /api/seed`. Anything that does not parse is treated as `{}`.
#[derive(Debug, Default, Deserialize)]
pub struct SeedRequest {
    #[serde(default)]
    pub clear: bool,
    #[serde(default, rename = "type")]
    pub seed_type: Option<String>,
}

impl SeedRequest {
    pub fn parse(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }

    fn includes(&self, kind: &str) -> bool {
        match self.seed_type.as_deref().filter(|t| !t.is_empty()) {
            None | Some("all") => true,
            Some(t) => t == kind,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeededCustomer {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl From<&Customer> for SeededCustomer {
    fn from(c: &Customer) -> Self {
        Self {
            id: c.id.to_hex(),
            name: c.name.clone(),
            email: c.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeededProject {
    pub id: String,
    pub name: String,
    pub project_number: String,
    pub customer: String,
}

impl From<&Project> for SeededProject {
    fn from(p: &Project) -> Self {
        Self {
            id: p.id.to_hex(),
            name: p.name.clone(),
            project_number: p.project_number.clone(),
            customer: p.customer.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedGroup<T> {
    pub count: u64,
    pub data: Vec<T>,
}

impl<T> SeedGroup<T> {
    fn new(data: Vec<T>) -> Self {
        Self { count: data.len() as u64, data }
    }
}

const ALREADY_SEEDED: &str = "Some records already exist in the database. Clear existing data first.";

fn seed_conflict(err: StoreError) -> ApiError {
    if err.is_duplicate_key() {
        ApiError::bad_request(ALREADY_SEEDED)
    } else {
        err.into()
    }
}

/// POST /api/seed - Load the demo customers and projects
pub async fn post(State(state): State<AppState>, body: Bytes) -> ApiResult<()> {
    seed(&state, SeedRequest::parse(&body))
        .await
        .map_err(|e| e.or_fallback("Failed to seed database"))
}

async fn seed(state: &AppState, request: SeedRequest) -> ApiResult<()> {
    let mut seeded_customers: Option<SeedGroup<SeededCustomer>> = None;
    let mut seeded_projects: Option<SeedGroup<SeededProject>> = None;

    if request.includes("customers") {
        let repo = state.repo::<Customer>();
        if request.clear {
            let removed = repo.delete_many(&Condition::All).await?;
            info!("Cleared {} customers before seeding", removed);
        }

        let candidates = demo_customers();
        let emails: Vec<&str> = candidates.iter().map(|c| c.email.as_str()).collect();
        let existing = repo
            .select_any(&Filter::new().where_clause(Condition::in_list("email", emails)).build())
            .await?;
        let total = candidates.len();
        let fresh: Vec<Customer> = candidates
            .into_iter()
            .filter(|c| !existing.iter().any(|e| e.email == c.email))
            .collect();

        if !fresh.is_empty() {
            repo.insert_many(&fresh).await.map_err(seed_conflict)?;
            info!("Seeded {} customers", fresh.len());
            seeded_customers = Some(SeedGroup::new(fresh.iter().map(SeededCustomer::from).collect()));
        } else if !request.clear {
            return Ok(ApiResponse::empty()
                .with_message("All customers already exist in the database")
                .with_field("customers", json!({ "count": 0, "skipped": total }))
                .with_field("projects", serde_json::Value::Null));
        }
    }

    if request.includes("projects") {
        let repo = state.repo::<Project>();
        let existing = repo.count(&Condition::All).await?;
        if existing > 0 && !request.clear {
            return Err(ApiError::rejected(
                format!(
                    "Database already contains {} projects. Send {{ \"clear\": true }} in the request body to clear and reseed.",
                    existing
                ),
                json!({ "existingCount": existing }),
            ));
        }
        if existing > 0 {
            repo.delete_many(&Condition::All).await?;
            info!("Cleared {} projects before seeding", existing);
        }

        let projects = demo_projects();
        repo.insert_many(&projects).await.map_err(seed_conflict)?;
        info!("Seeded {} projects", projects.len());
        seeded_projects = Some(SeedGroup::new(projects.iter().map(SeededProject::from).collect()));
    }

    Ok(ApiResponse::empty()
        .with_status(StatusCode::CREATED)
        .with_message("Successfully seeded database")
        .with_field("customers", seeded_customers)
        .with_field("projects", seeded_projects))
}

/// GET /api/seed - Counts and a sample of what is currently stored
pub async fn get(State(state): State<AppState>) -> ApiResult<()> {
    status(&state)
        .await
        .map_err(|e| e.or_fallback("Failed to check seed status"))
}

async fn status(state: &AppState) -> ApiResult<()> {
    let sample = Filter::new().paginate(1, SAMPLE_SIZE).build();

    let customers = state.repo::<Customer>();
    let customer_count = customers.count(&Condition::All).await?;
    let customer_sample: Vec<SeededCustomer> = customers
        .select_any(&sample)
        .await?
        .iter()
        .map(SeededCustomer::from)
        .collect();

    let projects = state.repo::<Project>();
    let project_count = projects.count(&Condition::All).await?;
    let project_sample: Vec<SeededProject> = projects
        .select_any(&sample)
        .await?
        .iter()
        .map(SeededProject::from)
        .collect();

    Ok(ApiResponse::empty()
        .with_field("customers", SeedGroup { count: customer_count, data: customer_sample })
        .with_field("projects", SeedGroup { count: project_count, data: project_sample }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lenient_body_parsing() {
        let request = SeedRequest::parse(b"");
        assert!(!request.clear);
        assert!(request.includes("customers") && request.includes("projects"));

        let request = SeedRequest::parse(b"not json");
        assert!(!request.clear);

        let request = SeedRequest::parse(br#"{"clear": true, "type": "projects"}"#);
        assert!(request.clear);
        assert!(request.includes("projects"));
        assert!(!request.includes("customers"));
    }

    #[test]
    fn unknown_type_seeds_nothing() {
        let request = SeedRequest::parse(br#"{"type": "tasks"}"#);
        assert!(!request.includes("customers"));
        assert!(!request.includes("projects"));
    }
}
