// Supplier and contractor commands

use clap::{Args, Subcommand};
use rusqlite::Connection;
use crate::models::{
    AuthSession, ContractorFields, OrderStatus, ProjectStatus, SupplierFields, SupplierPhone,
    SupplierStatus,
};
use crate::repo::{ContractorRepo, RatingRepo, RatingTarget, SupplierRepo};
use crate::cli::error::{parse_amount, user_error, validate_id, validate_non_empty, validate_rating};
use crate::cli::output::{
    format_contractor_detail, format_contractor_table, format_supplier_detail,
    format_supplier_table, OutputOptions,
};
use crate::utils::parse_date;
use anyhow::{Context, Result};

#[derive(Subcommand)]
pub enum SupplierCommands {
    /// Add a supplier
    Add {
        /// Supplier name
        name: String,
        /// Legal form, e.g. ООО, ИП
        #[arg(long)]
        entity_type: String,
        #[command(flatten)]
        fields: SupplierArgs,
    },
    /// List suppliers, active first
    List {
        /// Match name, location or category
        #[arg(long, short = 's')]
        search: Option<String>,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Show a supplier with orders and reviews
    Show {
        id: String,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Change supplier fields; list options replace the stored lists
    Modify {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        entity_type: Option<String>,
        #[command(flatten)]
        fields: SupplierArgs,
    },
    /// Set status: active, on-hold or inactive
    Status {
        id: String,
        status: String,
    },
    /// Place an order
    Order {
        /// Supplier ID
        id: String,
        /// Order title
        title: String,
        #[arg(long)]
        description: Option<String>,
        /// Amount in rubles
        #[arg(long, default_value = "0")]
        amount: String,
    },
    /// Set order status: pending, in_progress, completed or cancelled
    OrderStatus {
        order_id: String,
        status: String,
    },
    /// Leave a 1-5 review
    Rate {
        /// Supplier ID
        id: String,
        /// Stars, 1 to 5
        rating: String,
        /// Order the review is about
        #[arg(long)]
        order: Option<String>,
        #[arg(long)]
        comment: Option<String>,
    },
}

/// Optional supplier fields shared by `add` and `modify`
#[derive(Args)]
pub struct SupplierArgs {
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    /// Contact person
    #[arg(long)]
    pub contact: Option<String>,
    /// Product category (repeatable)
    #[arg(long = "category")]
    pub categories: Vec<String>,
    /// Tag (repeatable)
    #[arg(long = "tag")]
    pub tags: Vec<String>,
    /// Phone as number[:mobile|landline[:whatsapp|telegram|viber]] (repeatable)
    #[arg(long = "phone")]
    pub phones: Vec<String>,
}

impl SupplierArgs {
    fn into_fields(self, name: Option<String>, entity_type: Option<String>) -> SupplierFields {
        let phones: Vec<SupplierPhone> = self
            .phones
            .iter()
            .map(|spec| SupplierPhone::parse_spec(spec).unwrap_or_else(|e| user_error(&e)))
            .collect();
        SupplierFields {
            name,
            entity_type,
            location: self.location,
            email: self.email,
            contact_person: self.contact,
            categories: non_empty(self.categories),
            tags: non_empty(self.tags),
            phones: if phones.is_empty() { None } else { Some(phones) },
        }
    }
}

fn non_empty(values: Vec<String>) -> Option<Vec<String>> {
    if values.is_empty() { None } else { Some(values) }
}

#[derive(Subcommand)]
pub enum ContractorCommands {
    /// Add a contractor
    Add {
        /// Company name
        company: String,
        #[command(flatten)]
        fields: ContractorArgs,
    },
    /// List contractors, verified first
    List {
        /// Match company name, description or specialization
        #[arg(long, short = 's')]
        search: Option<String>,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Show a contractor with projects and reviews
    Show {
        id: String,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Change contractor fields; --specialization replaces the list
    Modify {
        id: String,
        #[arg(long)]
        company: Option<String>,
        #[command(flatten)]
        fields: ContractorArgs,
    },
    /// Mark a contractor verified (or not, with --revoke)
    Verify {
        id: String,
        #[arg(long)]
        revoke: bool,
    },
    /// Record a project
    Project {
        /// Contractor ID
        id: String,
        /// Project title
        title: String,
        #[arg(long)]
        description: Option<String>,
        /// Start date
        #[arg(long)]
        start: Option<String>,
        /// End date
        #[arg(long)]
        end: Option<String>,
    },
    /// Set project status: in_progress, completed or cancelled
    ProjectStatus {
        project_id: String,
        status: String,
    },
    /// Leave a 1-5 review
    Rate {
        /// Contractor ID
        id: String,
        /// Stars, 1 to 5
        rating: String,
        /// Project the review is about
        #[arg(long)]
        project: Option<String>,
        #[arg(long)]
        comment: Option<String>,
    },
}

#[derive(Args)]
pub struct ContractorArgs {
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// Years of experience
    #[arg(long)]
    pub experience: Option<i64>,
    /// Specialization (repeatable)
    #[arg(long = "specialization")]
    pub specializations: Vec<String>,
}

impl ContractorArgs {
    fn into_fields(self, company_name: Option<String>) -> ContractorFields {
        if matches!(self.experience, Some(years) if years < 0) {
            user_error("Experience must be a non-negative number of years");
        }
        ContractorFields {
            company_name,
            phone: self.phone,
            description: self.description,
            experience_years: self.experience,
            specializations: non_empty(self.specializations),
        }
    }
}

fn id_arg(id: &str, kind: &str) -> i64 {
    validate_id(id, kind).unwrap_or_else(|e| user_error(&e))
}

fn rating_arg(rating: &str) -> i64 {
    validate_rating(rating).unwrap_or_else(|e| user_error(&e))
}

pub fn handle_suppliers(conn: &Connection, session: &AuthSession, cmd: SupplierCommands, opts: OutputOptions) -> Result<()> {
    match cmd {
        SupplierCommands::Add { name, entity_type, fields } => {
            if let Err(e) = validate_non_empty(&name, "Supplier name") {
                user_error(&e);
            }
            if let Err(e) = validate_non_empty(&entity_type, "Entity type") {
                user_error(&e);
            }
            let supplier = SupplierRepo::create(conn, &fields.into_fields(Some(name), Some(entity_type)))?;
            println!("Created supplier {}: {}", supplier.id.unwrap_or_default(), supplier.name);
            Ok(())
        }
        SupplierCommands::List { search, json } => {
            let suppliers = SupplierRepo::list(conn, search.as_deref())
                .context("Failed to list suppliers")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&suppliers)?);
            } else {
                println!("{}", format_supplier_table(&suppliers, opts));
            }
            Ok(())
        }
        SupplierCommands::Show { id, json } => {
            let id = id_arg(&id, "supplier");
            let supplier = match SupplierRepo::get_by_id(conn, id)? {
                Some(supplier) => supplier,
                None => user_error(&format!("Supplier {} not found", id)),
            };
            let orders = SupplierRepo::list_orders(conn, id)?;
            let ratings = RatingRepo::list(conn, RatingTarget::Supplier, id)?;
            if json {
                let value = serde_json::json!({
                    "supplier": supplier,
                    "orders": orders,
                    "ratings": ratings,
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!("{}", format_supplier_detail(&supplier, &orders, &ratings, opts));
            }
            Ok(())
        }
        SupplierCommands::Modify { id, name, entity_type, fields } => {
            let id = id_arg(&id, "supplier");
            let supplier = SupplierRepo::update(conn, id, &fields.into_fields(name, entity_type))?;
            println!("Modified supplier {}: {}", id, supplier.name);
            Ok(())
        }
        SupplierCommands::Status { id, status } => {
            let id = id_arg(&id, "supplier");
            let status = SupplierStatus::from_str(&status).unwrap_or_else(|| {
                user_error(&format!("Invalid status '{}'. Use active, on-hold or inactive.", status))
            });
            SupplierRepo::set_status(conn, id, status)?;
            println!("Supplier {} is now {}", id, status.label());
            Ok(())
        }
        SupplierCommands::Order { id, title, description, amount } => {
            let id = id_arg(&id, "supplier");
            if let Err(e) = validate_non_empty(&title, "Order title") {
                user_error(&e);
            }
            let amount = parse_amount(&amount, "amount").unwrap_or_else(|e| user_error(&e));
            let order = SupplierRepo::add_order(conn, id, &title, description.as_deref(), amount)?;
            println!("Created order {} for supplier {}", order.id.unwrap_or_default(), id);
            Ok(())
        }
        SupplierCommands::OrderStatus { order_id, status } => {
            let order_id = id_arg(&order_id, "order");
            let status = OrderStatus::from_str(&status).unwrap_or_else(|| {
                user_error(&format!(
                    "Invalid order status '{}'. Use pending, in_progress, completed or cancelled.",
                    status
                ))
            });
            SupplierRepo::set_order_status(conn, order_id, status)?;
            println!("Order {} is now {}", order_id, status.as_str());
            Ok(())
        }
        SupplierCommands::Rate { id, rating, order, comment } => {
            let id = id_arg(&id, "supplier");
            let rating = rating_arg(&rating);
            let order_id = order.as_deref().map(|o| id_arg(o, "order"));
            RatingRepo::add(
                conn, RatingTarget::Supplier, id, order_id, rating,
                comment.as_deref(), &session.user.full_name,
            )?;
            let average = RatingRepo::average(conn, RatingTarget::Supplier, id)?;
            println!(
                "Rated supplier {} with {} stars (average {:.1})",
                id, rating, average.unwrap_or(rating as f64)
            );
            Ok(())
        }
    }
}

pub fn handle_contractors(conn: &Connection, session: &AuthSession, cmd: ContractorCommands, opts: OutputOptions) -> Result<()> {
    match cmd {
        ContractorCommands::Add { company, fields } => {
            if let Err(e) = validate_non_empty(&company, "Company name") {
                user_error(&e);
            }
            let contractor = ContractorRepo::create(conn, &fields.into_fields(Some(company)))?;
            println!("Created contractor {}: {}", contractor.id.unwrap_or_default(), contractor.company_name);
            Ok(())
        }
        ContractorCommands::List { search, json } => {
            let contractors = ContractorRepo::list(conn, search.as_deref())
                .context("Failed to list contractors")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&contractors)?);
            } else {
                println!("{}", format_contractor_table(&contractors, opts));
            }
            Ok(())
        }
        ContractorCommands::Show { id, json } => {
            let id = id_arg(&id, "contractor");
            let contractor = match ContractorRepo::get_by_id(conn, id)? {
                Some(contractor) => contractor,
                None => user_error(&format!("Contractor {} not found", id)),
            };
            let projects = ContractorRepo::list_projects(conn, id)?;
            let ratings = RatingRepo::list(conn, RatingTarget::Contractor, id)?;
            if json {
                let value = serde_json::json!({
                    "contractor": contractor,
                    "projects": projects,
                    "ratings": ratings,
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!("{}", format_contractor_detail(&contractor, &projects, &ratings, opts));
            }
            Ok(())
        }
        ContractorCommands::Modify { id, company, fields } => {
            let id = id_arg(&id, "contractor");
            let contractor = ContractorRepo::update(conn, id, &fields.into_fields(company))?;
            println!("Modified contractor {}: {}", id, contractor.company_name);
            Ok(())
        }
        ContractorCommands::Verify { id, revoke } => {
            let id = id_arg(&id, "contractor");
            ContractorRepo::set_verified(conn, id, !revoke)?;
            if revoke {
                println!("Contractor {} is no longer verified", id);
            } else {
                println!("Contractor {} verified", id);
            }
            Ok(())
        }
        ContractorCommands::Project { id, title, description, start, end } => {
            let id = id_arg(&id, "contractor");
            if let Err(e) = validate_non_empty(&title, "Project title") {
                user_error(&e);
            }
            let start = start.map(|d| parse_date(&d).unwrap_or_else(|e| user_error(&e.to_string())));
            let end = end.map(|d| parse_date(&d).unwrap_or_else(|e| user_error(&e.to_string())));
            let project = ContractorRepo::add_project(
                conn, id, &title, description.as_deref(), start.as_deref(), end.as_deref(),
            )?;
            println!("Created project {} for contractor {}", project.id.unwrap_or_default(), id);
            Ok(())
        }
        ContractorCommands::ProjectStatus { project_id, status } => {
            let project_id = id_arg(&project_id, "project");
            let status = ProjectStatus::from_str(&status).unwrap_or_else(|| {
                user_error(&format!(
                    "Invalid project status '{}'. Use in_progress, completed or cancelled.",
                    status
                ))
            });
            ContractorRepo::set_project_status(conn, project_id, status)?;
            println!("Project {} is now {}", project_id, status.as_str());
            Ok(())
        }
        ContractorCommands::Rate { id, rating, project, comment } => {
            let id = id_arg(&id, "contractor");
            let rating = rating_arg(&rating);
            let project_id = project.as_deref().map(|p| id_arg(p, "project"));
            RatingRepo::add(
                conn, RatingTarget::Contractor, id, project_id, rating,
                comment.as_deref(), &session.user.full_name,
            )?;
            let average = RatingRepo::average(conn, RatingTarget::Contractor, id)?;
            println!(
                "Rated contractor {} with {} stars (average {:.1})",
                id, rating, average.unwrap_or(rating as f64)
            );
            Ok(())
        }
    }
}
