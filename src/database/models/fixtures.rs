//! Demo records loaded by `POST /api/seed`.

use bson::oid::ObjectId;
use bson::DateTime;

use super::customer::{normalize_email, Customer};
use super::project::Project;
use crate::types::ProjectType;

struct DemoCustomer {
    name: &'static str,
    email: &'static str,
}

struct DemoProject {
    name: &'static str,
    customer: &'static str,
    location: &'static str,
    project_type: ProjectType,
    open_invoice: f64,
    paid_invoice: f64,
    created: &'static str,
    project_number: &'static str,
}

const CUSTOMERS: &[DemoCustomer] = &[
    DemoCustomer { name: "Kamran Ali", email: "kamran@yourbuildpro.com" },
    DemoCustomer { name: "Al-Fateh Group", email: "contact@alfateh.com" },
];

const PROJECTS: &[DemoProject] = &[
    DemoProject {
        name: "Build House",
        customer: "Kamran Ali",
        location: "Lahore, PK",
        project_type: ProjectType::ResidentialBuild,
        open_invoice: 2.0,
        paid_invoice: 3.0,
        created: "2025-03-10",
        project_number: "PRJ-2405",
    },
    DemoProject {
        name: "DHA Plaza Extension",
        customer: "Al-Fateh Group",
        location: "Islamabad, PK",
        project_type: ProjectType::HighRiseConstruction,
        open_invoice: 1.0,
        paid_invoice: 6.0,
        created: "2025-01-15",
        project_number: "PRJ-2401",
    },
    DemoProject {
        name: "Sunrise Villas",
        customer: "Kamran Ali",
        location: "Karachi, PK",
        project_type: ProjectType::ResidentialBuild,
        open_invoice: 3.0,
        paid_invoice: 6.0,
        created: "2024-12-20",
        project_number: "PRJ-2398",
    },
];

pub fn demo_customers() -> Vec<Customer> {
    let now = DateTime::now();
    CUSTOMERS
        .iter()
        .map(|c| Customer {
            id: ObjectId::new(),
            name: c.name.to_string(),
            email: normalize_email(c.email),
            phone: None,
            address: None,
            created_at: now,
            updated_at: now,
        })
        .collect()
}

pub fn demo_projects() -> Vec<Project> {
    let now = DateTime::now();
    PROJECTS
        .iter()
        .map(|p| Project {
            id: ObjectId::new(),
            name: p.name.to_string(),
            customer: p.customer.to_string(),
            location: p.location.to_string(),
            project_type: p.project_type,
            open_invoice: p.open_invoice,
            paid_invoice: p.paid_invoice,
            created: p.created.to_string(),
            project_number: p.project_number.to_string(),
            budget_variance: None,
            description: None,
            cover_photo: None,
            created_at: now,
            updated_at: now,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_records_pass_model_validation() {
        for customer in demo_customers() {
            customer.validate_document().unwrap();
        }
        let projects = demo_projects();
        for project in &projects {
            project.validate_document().unwrap();
        }
        let numbers: Vec<_> = projects.iter().map(|p| p.project_number.as_str()).collect();
        assert_eq!(numbers, vec!["PRJ-2405", "PRJ-2401", "PRJ-2398"]);
    }
}
