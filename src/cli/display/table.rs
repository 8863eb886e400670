//! Table rendering for CLI output

use super::{ColorTheme, StatusIcon};
use crate::domain::model::{Application, Environment, ServiceStatus, Workload, WorkloadCategory};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, Color, ContentArrangement, Table};

pub struct TableRenderer {
    theme: ColorTheme,
}

impl Default for TableRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(h).set_alignment(CellAlignment::Left))
                .collect::<Vec<_>>(),
        );
    table
}

fn banner(title: &str, count: usize, noun: &str) -> String {
    format!(
        "╭─ {} {} ─╮\n",
        title,
        format!("[{} {}]", count, noun).bright_black()
    )
}

impl TableRenderer {
    pub fn new() -> Self {
        Self {
            theme: ColorTheme::default(),
        }
    }

    pub fn render_applications(&self, apps: &[Application]) -> String {
        if apps.is_empty() {
            return "No applications found".to_string();
        }
        let mut table = new_table(&["NAME", "DOMAIN"]);
        for app in apps {
            table.add_row(vec![
                Cell::new(&app.name),
                Cell::new(app.domain.as_deref().unwrap_or("-")).fg(self.theme.muted),
            ]);
        }
        format!("{}{}", banner("Applications", apps.len(), "apps"), table)
    }

    pub fn render_environments(&self, app: &str, envs: &[Environment]) -> String {
        if envs.is_empty() {
            return format!("No environments found in application {}", app);
        }
        let mut table = new_table(&["NAME", "NAMESPACE", "PROD"]);
        for env in envs {
            let prod = if env.prod {
                Cell::new("yes").fg(self.theme.warning)
            } else {
                Cell::new("no").fg(self.theme.muted)
            };
            table.add_row(vec![Cell::new(&env.name), Cell::new(&env.namespace), prod]);
        }
        format!(
            "{}{}",
            banner(&format!("Environments in {}", app), envs.len(), "environments"),
            table
        )
    }

    pub fn render_workloads(
        &self,
        category: WorkloadCategory,
        app: &str,
        workloads: &[Workload],
    ) -> String {
        if workloads.is_empty() {
            return format!("No {}s found in application {}", category.noun(), app);
        }
        let mut table = new_table(&["NAME", "TYPE"]);
        for workload in workloads {
            table.add_row(vec![
                Cell::new(&workload.name),
                Cell::new(workload.workload_type.as_str()).fg(self.theme.info),
            ]);
        }
        let title = match category {
            WorkloadCategory::Service => format!("Services in {}", app),
            WorkloadCategory::Job => format!("Jobs in {}", app),
        };
        format!(
            "{}{}",
            banner(&title, workloads.len(), &format!("{}s", category.noun())),
            table
        )
    }

    pub fn render_service_status(&self, status: &ServiceStatus) -> String {
        let icon = StatusIcon::get_count_icon(status.running, status.desired);
        let text = StatusIcon::get_status_text(status.running, status.desired);
        let color = self.theme.get_count_color(status.running, status.desired);

        let mut summary = Table::new();
        summary
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        summary.add_row(vec![Cell::new(format!(
            "Service: {} | Environment: {} | Application: {}",
            status.name, status.env, status.app
        ))]);
        summary.add_row(vec![Cell::new(format!(
            "Status: {} {} ({}/{} running)",
            icon, text, status.running, status.desired
        ))
        .fg(color)]);
        if let Some(image) = &status.image {
            summary.add_row(vec![Cell::new(format!("Image: {}", image))]);
        }
        if let Some(endpoint) = &status.endpoint {
            summary.add_row(vec![Cell::new(format!("Endpoint: {}", endpoint)).fg(Color::Cyan)]);
        }

        let mut output = summary.to_string();
        if status.tasks.is_empty() {
            output.push_str("\nNo tasks running");
            return output;
        }

        let mut tasks = new_table(&["TASK", "PHASE", "READY", "RESTARTS", "STARTED"]);
        for task in &status.tasks {
            let started = task
                .started_at
                .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                .unwrap_or_else(|| "-".to_string());
            tasks.add_row(vec![
                Cell::new(&task.id),
                Cell::new(&task.phase).fg(self.theme.get_phase_color(&task.phase)),
                Cell::new(StatusIcon::get_ready_icon(task.ready)),
                Cell::new(task.restarts).set_alignment(CellAlignment::Right),
                Cell::new(started),
            ]);
        }
        output.push('\n');
        output.push_str(&tasks.to_string());
        output
    }
}
