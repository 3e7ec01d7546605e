mod common;

use anyhow::Result;

use buildpro_api::client::{BuildProClient, ListParams, SeedOptions};
use buildpro_api::database::models::{CreateCustomer, CreateProject, CreateTask, UpdateTask};
use buildpro_api::types::{TaskPriority, TaskStatus};

#[tokio::test]
async fn client_round_trips_through_the_api() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = BuildProClient::new(&server.base_url)?;

    let created = client
        .create_customer(&CreateCustomer {
            name: Some("Jane Doe".into()),
            email: Some("JANE@X.COM".into()),
            ..Default::default()
        })
        .await;
    assert!(created.success, "{:?}", created.error);
    let customer = created.data.unwrap();
    assert_eq!(customer.email, "jane@x.com");

    let duplicate = client
        .create_customer(&CreateCustomer {
            name: Some("Jane".into()),
            email: Some("jane@x.com".into()),
            ..Default::default()
        })
        .await;
    assert!(!duplicate.success);
    assert_eq!(duplicate.error.as_deref(), Some("A customer with this email already exists"));

    let project = client
        .create_project(&CreateProject {
            project_name: Some("Jane's Kitchen".into()),
            customer: Some(customer.id.clone()),
            remodel_type: Some("Renovation".into()),
            ..Default::default()
        })
        .await;
    assert!(project.success, "{:?}", project.error);
    assert_eq!(project.data.unwrap().customer, "Jane Doe");

    let listed = client.get_customers(&ListParams::new().search("jane")).await;
    assert_eq!(listed.data.map(|d| d.len()), Some(1));
    assert_eq!(listed.pagination.map(|p| p.total), Some(1));
    Ok(())
}

#[tokio::test]
async fn client_task_bulk_operations() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = BuildProClient::new(&server.base_url)?;

    let mut ids = Vec::new();
    for title in ["Frame walls", "Install windows"] {
        let task = client
            .create_task(&CreateTask { title: Some(title.into()), ..Default::default() })
            .await;
        ids.push(task.data.unwrap().id);
    }

    let status = client.bulk_update_task_status(&ids, TaskStatus::Completed).await;
    assert!(status.success, "{:?}", status.error);
    assert_eq!(status.field("modifiedCount"), Some(&serde_json::json!(2)));

    let priority = client.bulk_update_task_priority(&ids[..1], TaskPriority::High).await;
    assert_eq!(priority.field("modifiedCount"), Some(&serde_json::json!(1)));

    let updated = client
        .update_task(&ids[1], &UpdateTask { description: Some(Some("South side".into())), ..Default::default() })
        .await;
    let task = updated.data.unwrap();
    assert_eq!(task.description.as_deref(), Some("South side"));
    assert_eq!(task.status, TaskStatus::Completed);

    let completed = client.get_tasks(&ListParams::new().param("status", "completed")).await;
    assert_eq!(completed.data.map(|d| d.len()), Some(2));

    let deleted = client.bulk_delete_tasks(&ids).await;
    assert_eq!(deleted.field("deletedCount"), Some(&serde_json::json!(2)));
    Ok(())
}

#[tokio::test]
async fn client_uploads_and_seeds() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = BuildProClient::new(&server.base_url)?;

    let image = client.upload_image("front.png", b"png".to_vec(), "image/png").await;
    assert!(image.success, "{:?}", image.error);
    assert!(image.data.unwrap().url.starts_with("/uploads/"));

    let rejected = client.upload_image("notes.txt", b"txt".to_vec(), "text/plain").await;
    assert_eq!(rejected.error.as_deref(), Some("File must be an image"));

    let seeded = client.seed(&SeedOptions::default()).await;
    assert!(seeded.success, "{:?}", seeded.error);
    assert_eq!(seeded.message.as_deref(), Some("Successfully seeded database"));

    let status = client.seed_status().await;
    assert_eq!(status.field("projects").and_then(|p| p.get("count")), Some(&serde_json::json!(3)));
    Ok(())
}

#[tokio::test]
async fn unreachable_server_becomes_a_failed_envelope() -> Result<()> {
    let port = portpicker::pick_unused_port().expect("free port");
    let client = BuildProClient::new(&format!("http://127.0.0.1:{}", port))?;

    let response = client.get_task("65a1b2c3d4e5f60718293a4b").await;
    assert!(!response.success);
    assert!(response.data.is_none());
    assert!(response.error.is_some());
    Ok(())
}
