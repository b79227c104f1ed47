// Output formatting utilities

use crate::models::{
    format_stars, service_label, Contractor, ContractorProject, Estimate, ProjectStatus, Rating,
    Stage, Supplier, SupplierOrder, SupplierStatus, Task, TaskBoard, TaskPriority,
};
use crate::pipeline::{PipelineStatus, PipelineSummary};
use crate::repo::{ClientDetail, ClientOverview, Dashboard};
use crate::utils::{format_date, format_timestamp, truncate};
use std::io::IsTerminal;

// ANSI escape codes for terminal formatting
const ANSI_BOLD: &str = "\x1b[1m";
const ANSI_RESET: &str = "\x1b[0m";

const ANSI_FG_RED: &str = "\x1b[31m";
const ANSI_FG_GREEN: &str = "\x1b[32m";
const ANSI_FG_YELLOW: &str = "\x1b[33m";
const ANSI_FG_BLUE: &str = "\x1b[34m";
const ANSI_FG_CYAN: &str = "\x1b[36m";
const ANSI_FG_BRIGHT_BLACK: &str = "\x1b[90m";

const PROGRESS_BAR_WIDTH: usize = 20;

/// Check if stdout is a terminal (TTY)
pub fn is_tty() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width dynamically
///
/// Uses the `terminal_size` crate, with fallback to the COLUMNS environment
/// variable and a default of 120.
pub fn get_terminal_width() -> usize {
    if let Some((terminal_size::Width(w), _)) = terminal_size::terminal_size() {
        if w > 0 {
            return w as usize;
        }
    }

    if let Ok(cols) = std::env::var("COLUMNS") {
        if let Ok(width) = cols.parse::<usize>() {
            if width > 0 && width < 10000 {
                return width;
            }
        }
    }

    120
}

/// Rendering options shared by the table formatters
#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub color: bool,
    pub width: usize,
}

impl OutputOptions {
    pub fn detect() -> Self {
        Self {
            color: is_tty(),
            width: get_terminal_width(),
        }
    }

    /// Plain output, used by tests
    pub fn plain() -> Self {
        Self { color: false, width: 120 }
    }
}

fn paint(text: &str, color: &str, enabled: bool) -> String {
    if enabled {
        format!("{}{}{}", color, text, ANSI_RESET)
    } else {
        text.to_string()
    }
}

fn bold(text: &str, enabled: bool) -> String {
    paint(text, ANSI_BOLD, enabled)
}

/// Terminal color for each pipeline bucket
pub fn pipeline_color(status: PipelineStatus) -> &'static str {
    match status {
        PipelineStatus::New => ANSI_FG_BRIGHT_BLACK,
        PipelineStatus::CallScheduled => ANSI_FG_BLUE,
        PipelineStatus::ProposalSent => ANSI_FG_YELLOW,
        PipelineStatus::InProgress => ANSI_FG_CYAN,
        PipelineStatus::Completed => ANSI_FG_GREEN,
    }
}

fn priority_color(priority: TaskPriority) -> &'static str {
    match priority {
        TaskPriority::High => ANSI_FG_RED,
        TaskPriority::Medium => ANSI_FG_YELLOW,
        TaskPriority::Low => ANSI_FG_BRIGHT_BLACK,
    }
}

// Pad by character count, then color, so escapes never skew alignment
fn cell(text: &str, width: usize) -> String {
    let text = truncate(text, width);
    let pad = width.saturating_sub(text.chars().count());
    format!("{}{}", text, " ".repeat(pad))
}

/// `[██████░░░░] 60%`
pub fn progress_bar(percent: u32, width: usize) -> String {
    let percent = percent.min(100);
    let filled = (width * percent as usize + 50) / 100;
    format!(
        "[{}{}] {}%",
        "█".repeat(filled),
        "░".repeat(width - filled),
        percent
    )
}

/// Rubles with space-grouped thousands and a decimal comma: `35 000,00 ₽`
pub fn format_money(amount: f64) -> String {
    let formatted = format!("{:.2}", amount.abs());
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::new();
    for (i, digit) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(*digit);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{}{},{} ₽", sign, grouped, frac_part)
}

/// Quantities without trailing zeros: `100`, `2.5`
pub fn format_quantity(quantity: f64) -> String {
    let s = format!("{:.3}", quantity);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn status_badge(summary: &PipelineSummary, opts: OutputOptions, width: usize) -> String {
    paint(&cell(summary.status_label, width), pipeline_color(summary.status), opts.color)
}

/// Client list with derived pipeline status
pub fn format_client_table(clients: &[ClientOverview], opts: OutputOptions) -> String {
    if clients.is_empty() {
        return "No clients found.".to_string();
    }

    // ID, phone, status, progress and spacing take ~70 columns
    let name_width = opts.width.saturating_sub(70).clamp(16, 40);
    let mut out = String::new();
    out.push_str(&bold(
        &format!(
            "{:<5} {} {:<16} {:<14} {:<28} {}",
            "ID", cell("Name", name_width), "Phone", "Status", "Progress", "Last comment"
        ),
        opts.color,
    ));
    out.push('\n');

    for overview in clients {
        let client = &overview.client;
        let last_comment = overview
            .last_comment
            .as_ref()
            .map(|c| truncate(&c.content, 30))
            .unwrap_or_default();
        out.push_str(&format!(
            "{:<5} {} {} {} {:<28} {}\n",
            client.id.unwrap_or_default(),
            cell(&client.name, name_width),
            cell(client.phone.as_deref().unwrap_or("-"), 16),
            status_badge(&overview.pipeline, opts, 14),
            progress_bar(overview.pipeline.percent(), 10),
            last_comment,
        ));
    }
    out.trim_end().to_string()
}

/// Stages with completion marks and the current stage highlighted
pub fn format_stage_list(stages: &[Stage], summary: &PipelineSummary, opts: OutputOptions) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} {} ({}/{})\n",
        paint(summary.status_label, pipeline_color(summary.status), opts.color),
        progress_bar(summary.percent(), PROGRESS_BAR_WIDTH),
        summary.completed_stages,
        summary.total_stages,
    ));

    let mut sorted: Vec<&Stage> = stages.iter().collect();
    sorted.sort_by_key(|s| s.order);
    for stage in sorted {
        let mark = if stage.completed { "[x]" } else { "[ ]" };
        let pointer = if summary.is_current(stage) { "→" } else { " " };
        let line = match stage.completed_at {
            Some(ts) => format!("{} {} {}. {}  ({})", pointer, mark, stage.order, stage.name, format_timestamp(ts)),
            None => format!("{} {} {}. {}", pointer, mark, stage.order, stage.name),
        };
        if summary.is_current(stage) {
            out.push_str(&bold(&line, opts.color));
        } else if stage.completed {
            out.push_str(&paint(&line, ANSI_FG_GREEN, opts.color));
        } else {
            out.push_str(&line);
        }
        out.push('\n');
    }
    out.trim_end().to_string()
}

fn field_line(out: &mut String, label: &str, value: Option<String>) {
    if let Some(value) = value {
        if !value.is_empty() {
            out.push_str(&format!("  {:<16} {}\n", format!("{}:", label), value));
        }
    }
}

/// Full client card: contact fields, services, pipeline, comments
pub fn format_client_detail(detail: &ClientDetail, opts: OutputOptions) -> String {
    let client = &detail.client;
    let mut out = String::new();
    out.push_str(&bold(
        &format!("Client {}: {}", client.id.unwrap_or_default(), client.name),
        opts.color,
    ));
    out.push('\n');

    field_line(&mut out, "Phone", client.phone.clone());
    field_line(&mut out, "Email", client.email.clone());
    field_line(&mut out, "Address", client.address.clone());
    field_line(&mut out, "Project", client.project_description.clone());
    field_line(&mut out, "Budget", client.budget.map(format_money));
    field_line(&mut out, "Area", client.project_area.map(|a| format!("{} м²", format_quantity(a))));
    field_line(&mut out, "Last contact", client.last_contact.as_deref().map(format_date));
    field_line(&mut out, "Next action", client.next_action.clone());
    field_line(&mut out, "Notes", client.notes.clone());
    let services: Vec<&str> = client
        .services
        .iter()
        .map(|code| service_label(code).unwrap_or(code.as_str()))
        .collect();
    field_line(&mut out, "Services", Some(services.join(", ")));
    field_line(&mut out, "Created", Some(format_timestamp(client.created_ts)));

    out.push('\n');
    out.push_str(&bold("Pipeline", opts.color));
    out.push('\n');
    out.push_str(&format_stage_list(&detail.stages, &detail.pipeline, opts));
    out.push('\n');

    out.push('\n');
    out.push_str(&bold(&format!("Comments ({})", detail.comments.len()), opts.color));
    out.push('\n');
    if detail.comments.is_empty() {
        out.push_str("  No comments.\n");
    }
    for comment in &detail.comments {
        out.push_str(&format!(
            "  {} [{}] {}: {}\n",
            format_timestamp(comment.created_ts),
            comment.comment_type.as_str(),
            comment.author_name,
            comment.content,
        ));
    }
    out.trim_end().to_string()
}

pub fn format_estimate_table(estimates: &[Estimate], opts: OutputOptions) -> String {
    if estimates.is_empty() {
        return "No estimates found.".to_string();
    }

    let title_width = opts.width.saturating_sub(75).clamp(16, 40);
    let mut out = String::new();
    out.push_str(&bold(
        &format!(
            "{:<5} {} {:<20} {:<11} {:>18} {}",
            "ID", cell("Title", title_width), "Client", "Status", "Total", "Valid until"
        ),
        opts.color,
    ));
    out.push('\n');
    for estimate in estimates {
        out.push_str(&format!(
            "{:<5} {} {} {:<11} {:>18} {}\n",
            estimate.id.unwrap_or_default(),
            cell(&estimate.title, title_width),
            cell(estimate.client_name.as_deref().unwrap_or("-"), 20),
            estimate.status.label(),
            format_money(estimate.total()),
            estimate.valid_until.as_deref().map(format_date).unwrap_or_else(|| "-".to_string()),
        ));
    }
    out.trim_end().to_string()
}

/// Estimate header plus its line items and grand total
pub fn format_estimate_detail(estimate: &Estimate, opts: OutputOptions) -> String {
    let mut out = String::new();
    out.push_str(&bold(
        &format!("Estimate {}: {}", estimate.id.unwrap_or_default(), estimate.title),
        opts.color,
    ));
    out.push('\n');
    field_line(&mut out, "Client", estimate.client_name.clone());
    field_line(&mut out, "Status", Some(estimate.status.label().to_string()));
    field_line(&mut out, "Valid until", estimate.valid_until.as_deref().map(format_date));
    field_line(&mut out, "Created", Some(format_timestamp(estimate.created_ts)));
    out.push('\n');

    if estimate.items.is_empty() {
        out.push_str("  No items.\n");
    } else {
        out.push_str(&format!(
            "  {:<3} {} {:>8} {:<6} {:>16} {:>18}\n",
            "#", cell("Name", 30), "Qty", "Unit", "Price", "Sum"
        ));
        for (i, item) in estimate.items.iter().enumerate() {
            out.push_str(&format!(
                "  {:<3} {} {:>8} {} {:>16} {:>18}\n",
                i + 1,
                cell(&item.name, 30),
                format_quantity(item.quantity),
                cell(&item.unit, 6),
                format_money(item.price),
                format_money(item.line_total()),
            ));
        }
    }
    out.push_str(&bold(&format!("  Total: {}", format_money(estimate.total())), opts.color));
    out
}

fn supplier_status_color(status: SupplierStatus) -> &'static str {
    match status {
        SupplierStatus::Active => ANSI_FG_GREEN,
        SupplierStatus::OnHold => ANSI_FG_YELLOW,
        SupplierStatus::Inactive => ANSI_FG_BRIGHT_BLACK,
    }
}

pub fn format_supplier_table(suppliers: &[Supplier], opts: OutputOptions) -> String {
    if suppliers.is_empty() {
        return "No suppliers found.".to_string();
    }

    let name_width = opts.width.saturating_sub(80).clamp(16, 36);
    let mut out = String::new();
    out.push_str(&bold(
        &format!(
            "{:<5} {} {:<8} {:<16} {:<14} {:>6} {:<10} {}",
            "ID", cell("Name", name_width), "Type", "Location", "Status", "Orders", "Rating", "Categories"
        ),
        opts.color,
    ));
    out.push('\n');
    for supplier in suppliers {
        out.push_str(&format!(
            "{:<5} {} {} {} {} {:>6} {} {}\n",
            supplier.id.unwrap_or_default(),
            cell(&supplier.name, name_width),
            cell(&supplier.entity_type, 8),
            cell(supplier.location.as_deref().unwrap_or("-"), 16),
            paint(&cell(supplier.status.label(), 14), supplier_status_color(supplier.status), opts.color),
            supplier.orders_count,
            cell(&format_stars(supplier.rating), 10),
            supplier.categories.join(", "),
        ));
    }
    out.trim_end().to_string()
}

fn format_ratings(out: &mut String, ratings: &[Rating], reference_noun: &str) {
    if ratings.is_empty() {
        out.push_str("  No reviews.\n");
    }
    for rating in ratings {
        let reference = rating
            .reference_id
            .map(|id| format!(" ({} {})", reference_noun, id))
            .unwrap_or_default();
        out.push_str(&format!(
            "  {} {}{} {}: {}\n",
            "★".repeat(rating.rating.clamp(0, 5) as usize),
            format_timestamp(rating.created_ts),
            reference,
            rating.author_name,
            rating.comment.as_deref().unwrap_or(""),
        ));
    }
}

pub fn format_supplier_detail(
    supplier: &Supplier,
    orders: &[SupplierOrder],
    ratings: &[Rating],
    opts: OutputOptions,
) -> String {
    let mut out = String::new();
    out.push_str(&bold(
        &format!("Supplier {}: {} ({})", supplier.id.unwrap_or_default(), supplier.name, supplier.entity_type),
        opts.color,
    ));
    out.push('\n');
    field_line(
        &mut out,
        "Status",
        Some(paint(supplier.status.label(), supplier_status_color(supplier.status), opts.color)),
    );
    field_line(&mut out, "Location", supplier.location.clone());
    field_line(&mut out, "Email", supplier.email.clone());
    field_line(&mut out, "Contact", supplier.contact_person.clone());
    field_line(&mut out, "Categories", Some(supplier.categories.join(", ")));
    let tags: Vec<&str> = supplier.tags.iter().map(|t| t.name.as_str()).collect();
    field_line(&mut out, "Tags", Some(tags.join(", ")));
    for phone in &supplier.phones {
        let messenger = match phone.messenger.as_str() {
            "none" => String::new(),
            m => format!(", {}", m),
        };
        field_line(
            &mut out,
            "Phone",
            Some(format!("{} ({}{})", phone.number, phone.phone_type.as_str(), messenger)),
        );
    }
    field_line(&mut out, "Rating", Some(format_stars(supplier.rating)));
    field_line(&mut out, "Completed", Some(supplier.orders_count.to_string()));

    out.push('\n');
    out.push_str(&bold(&format!("Orders ({})", orders.len()), opts.color));
    out.push('\n');
    if orders.is_empty() {
        out.push_str("  No orders.\n");
    }
    for order in orders {
        out.push_str(&format!(
            "  {:<5} {} {:<12} {:>18}\n",
            order.id.unwrap_or_default(),
            cell(&order.title, 30),
            order.status.as_str(),
            format_money(order.amount),
        ));
    }

    out.push('\n');
    out.push_str(&bold(&format!("Reviews ({})", ratings.len()), opts.color));
    out.push('\n');
    format_ratings(&mut out, ratings, "order");
    out.trim_end().to_string()
}

pub fn format_contractor_table(contractors: &[Contractor], opts: OutputOptions) -> String {
    if contractors.is_empty() {
        return "No contractors found.".to_string();
    }

    let name_width = opts.width.saturating_sub(70).clamp(16, 36);
    let mut out = String::new();
    out.push_str(&bold(
        &format!(
            "{:<5} {} {:<9} {:>10} {:>8} {:<10} {}",
            "ID", cell("Company", name_width), "Verified", "Experience", "Projects", "Rating", "Specializations"
        ),
        opts.color,
    ));
    out.push('\n');
    for contractor in contractors {
        let verified = if contractor.verified { "yes" } else { "no" };
        out.push_str(&format!(
            "{:<5} {} {} {:>10} {:>8} {} {}\n",
            contractor.id.unwrap_or_default(),
            cell(&contractor.company_name, name_width),
            paint(&cell(verified, 9), if contractor.verified { ANSI_FG_GREEN } else { ANSI_FG_BRIGHT_BLACK }, opts.color),
            contractor.experience_years.map(|y| format!("{} y", y)).unwrap_or_else(|| "-".to_string()),
            contractor.completed_projects,
            cell(&format_stars(contractor.rating), 10),
            contractor.specializations.join(", "),
        ));
    }
    out.trim_end().to_string()
}

pub fn format_contractor_detail(
    contractor: &Contractor,
    projects: &[ContractorProject],
    ratings: &[Rating],
    opts: OutputOptions,
) -> String {
    let mut out = String::new();
    let verified = if contractor.verified { " [verified]" } else { "" };
    out.push_str(&bold(
        &format!("Contractor {}: {}{}", contractor.id.unwrap_or_default(), contractor.company_name, verified),
        opts.color,
    ));
    out.push('\n');
    field_line(&mut out, "Phone", contractor.phone.clone());
    field_line(&mut out, "Description", contractor.description.clone());
    field_line(&mut out, "Experience", contractor.experience_years.map(|y| format!("{} years", y)));
    field_line(&mut out, "Specializations", Some(contractor.specializations.join(", ")));
    field_line(&mut out, "Rating", Some(format_stars(contractor.rating)));
    field_line(&mut out, "Completed", Some(contractor.completed_projects.to_string()));

    out.push('\n');
    out.push_str(&bold(&format!("Projects ({})", projects.len()), opts.color));
    out.push('\n');
    if projects.is_empty() {
        out.push_str("  No projects.\n");
    }
    for project in projects {
        let dates = match (&project.start_date, &project.end_date) {
            (Some(start), Some(end)) => format!("{} - {}", format_date(start), format_date(end)),
            (Some(start), None) => format!("from {}", format_date(start)),
            (None, Some(end)) => format!("until {}", format_date(end)),
            (None, None) => String::new(),
        };
        let status = match project.status {
            ProjectStatus::Completed => paint("completed", ANSI_FG_GREEN, opts.color),
            other => other.as_str().to_string(),
        };
        out.push_str(&format!(
            "  {:<5} {} {} {}\n",
            project.id.unwrap_or_default(),
            cell(&project.title, 30),
            status,
            dates,
        ));
    }

    out.push('\n');
    out.push_str(&bold(&format!("Reviews ({})", ratings.len()), opts.color));
    out.push('\n');
    format_ratings(&mut out, ratings, "project");
    out.trim_end().to_string()
}

fn task_line(task: &Task, opts: OutputOptions) -> String {
    let priority = paint(&cell(task.priority.label(), 8), priority_color(task.priority), opts.color);
    let title = truncate(&task.title, opts.width.saturating_sub(60).max(20));
    let mut line = format!("  {:<5} {} {}", task.id.unwrap_or_default(), priority, title);
    if let Some(client) = &task.client_name {
        line.push_str(&format!(" · {}", client));
    }
    if let Some(due) = &task.due_date {
        line.push_str(&format!(" · due {}", format_date(due)));
    }
    line
}

/// Task board: one section per column, tasks already in board order
pub fn format_task_board(board: &TaskBoard, opts: OutputOptions) -> String {
    if board.is_empty() {
        return "No tasks.".to_string();
    }

    let mut out = String::new();
    for (title, tasks) in [
        ("Pending", &board.pending),
        ("In progress", &board.in_progress),
        ("Completed", &board.completed),
    ] {
        out.push_str(&bold(&format!("{} ({})", title, tasks.len()), opts.color));
        out.push('\n');
        for task in tasks {
            out.push_str(&task_line(task, opts));
            out.push('\n');
        }
        out.push('\n');
    }
    out.trim_end().to_string()
}

pub fn format_task_detail(task: &Task, opts: OutputOptions) -> String {
    let mut out = String::new();
    out.push_str(&bold(&format!("Task {}: {}", task.id.unwrap_or_default(), task.title), opts.color));
    out.push('\n');
    field_line(&mut out, "Status", Some(task.status.as_str().to_string()));
    field_line(&mut out, "Priority", Some(paint(task.priority.label(), priority_color(task.priority), opts.color)));
    field_line(&mut out, "Category", Some(task.category.as_str().to_string()));
    field_line(&mut out, "Client", task.client_name.clone());
    field_line(&mut out, "Due", task.due_date.as_deref().map(format_date));
    field_line(&mut out, "Description", task.description.clone());
    field_line(&mut out, "Created", Some(format_timestamp(task.created_ts)));
    out.trim_end().to_string()
}

pub fn format_dashboard(dashboard: &Dashboard, opts: OutputOptions) -> String {
    let mut out = String::new();
    out.push_str(&bold("Dashboard", opts.color));
    out.push('\n');
    out.push_str(&format!("  {:<20} {}\n", "Clients:", dashboard.total_clients));
    out.push_str(&format!("  {:<20} {}\n", "Open estimates:", dashboard.open_estimates));
    out.push_str(&format!("  {:<20} {}\n", "Proposals sent:", dashboard.proposals_sent));
    out.push_str(&format!(
        "  {:<20} {} ({})\n",
        "Approved:",
        dashboard.approved_estimates,
        format_money(dashboard.approved_total)
    ));

    out.push('\n');
    out.push_str(&bold("Recent clients", opts.color));
    out.push('\n');
    if dashboard.recent_clients.is_empty() {
        out.push_str("  No clients yet.\n");
    }
    for overview in &dashboard.recent_clients {
        out.push_str(&format!(
            "  {:<5} {} {} {}\n",
            overview.client.id.unwrap_or_default(),
            cell(&overview.client.name, 30),
            status_badge(&overview.pipeline, opts, 14),
            progress_bar(overview.pipeline.percent(), 10),
        ));
    }

    out.push('\n');
    out.push_str(&bold("Due today", opts.color));
    out.push('\n');
    if dashboard.today_tasks.is_empty() {
        out.push_str("  Nothing due today.\n");
    }
    for task in &dashboard.today_tasks {
        out.push_str(&task_line(task, opts));
        out.push('\n');
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EstimateItem, EstimateStatus, TaskCategory, TaskStatus};
    use crate::pipeline::derive_status;

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(0, 10), "[░░░░░░░░░░] 0%");
        assert_eq!(progress_bar(100, 10), "[██████████] 100%");
        assert_eq!(progress_bar(44, 10), "[████░░░░░░] 44%");
        assert_eq!(progress_bar(150, 4), "[████] 100%");
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(0.0), "0,00 ₽");
        assert_eq!(format_money(35000.0), "35 000,00 ₽");
        assert_eq!(format_money(1234567.5), "1 234 567,50 ₽");
        assert_eq!(format_money(999.999), "1 000,00 ₽");
    }

    #[test]
    fn test_format_quantity() {
        assert_eq!(format_quantity(100.0), "100");
        assert_eq!(format_quantity(2.5), "2.5");
        assert_eq!(format_quantity(0.125), "0.125");
    }

    #[test]
    fn test_cell_pads_cyrillic_by_chars() {
        assert_eq!(cell("Газон", 7), "Газон  ");
        assert_eq!(cell("Ландшафтный дизайн", 6).chars().count(), 6);
    }

    #[test]
    fn test_stage_list_marks_current() {
        let mut stages = crate::models::default_stages(1);
        stages[0].set_completed(true, 1);
        let summary = derive_status(&stages).unwrap();
        let text = format_stage_list(&stages, &summary, OutputOptions::plain());
        assert!(text.starts_with("Созвон"));
        assert!(text.contains("(1/9)"));
        assert!(text.contains("→ [ ] 2. "));
        assert!(!text.contains('\x1b'));
    }

    #[test]
    fn test_estimate_detail_total() {
        let estimate = Estimate {
            id: Some(3),
            title: "Газон".to_string(),
            client_id: None,
            client_name: None,
            status: EstimateStatus::Draft,
            valid_until: None,
            items: vec![
                EstimateItem::new("Рулонный газон", 100.0, "м2", 350.0),
                EstimateItem::new("Укладка", 1.0, "шт", 5000.0),
            ],
            created_ts: 0,
            modified_ts: 0,
        };
        let text = format_estimate_detail(&estimate, OutputOptions::plain());
        assert!(text.contains("Estimate 3: Газон"));
        assert!(text.contains("Total: 40 000,00 ₽"));
    }

    #[test]
    fn test_board_sections() {
        let task = Task {
            id: Some(1),
            title: "Позвонить".to_string(),
            description: None,
            client_id: None,
            client_name: Some("Иванов".to_string()),
            category: TaskCategory::Call,
            priority: TaskPriority::High,
            status: TaskStatus::Pending,
            due_date: Some("2026-06-01".to_string()),
            created_ts: 0,
            modified_ts: 0,
        };
        let board = TaskBoard::from_tasks(vec![task]);
        let text = format_task_board(&board, OutputOptions::plain());
        assert!(text.contains("Pending (1)"));
        assert!(text.contains("In progress (0)"));
        assert!(text.contains("Позвонить · Иванов · due 01.06.2026"));
        assert_eq!(format_task_board(&TaskBoard::default(), OutputOptions::plain()), "No tasks.");
    }
}
