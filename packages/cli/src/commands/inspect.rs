use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pagebuilder_editor::PersistenceGateway;
use pagebuilder_model::{Component, ComponentContent, PageDocument, PageId};
use std::path::Path;

use super::open_project;

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Page to print
    #[arg(short, long, default_value = "home")]
    pub page: String,

    /// Print the raw JSON document instead of the tree
    #[arg(long)]
    pub json: bool,
}

pub async fn inspect(args: InspectArgs, cwd: &Path) -> Result<()> {
    let (_, gateway) = open_project(cwd)?;
    let page_id = PageId::from(args.page.as_str());
    let doc = gateway.load(&page_id).await?;

    if args.json {
        println!("{}", doc.to_json_pretty()?);
        return Ok(());
    }

    print!("{}", render_tree(&page_id, &doc));

    if let Err(e) = doc.validate() {
        println!();
        println!("{} {}", "⚠️".yellow(), e);
    }

    Ok(())
}

/// Render the page as an indented tree, one node per line
pub fn render_tree(page_id: &PageId, doc: &PageDocument) -> String {
    let mut out = format!(
        "{} ({} sections, {} components)\n",
        page_id.to_string().bright_white().bold(),
        doc.section_count(),
        doc.component_count()
    );

    for (si, section) in doc.sections.iter().enumerate() {
        let last_section = si + 1 == doc.sections.len();
        let (branch, indent) = if last_section { ("└─", "   ") } else { ("├─", "│  ") };

        out.push_str(&format!(
            "{} {} {}{}\n",
            branch,
            section.kind.to_string().cyan(),
            section.id.to_string().dimmed(),
            hidden_marker(section.visible)
        ));

        for (ci, component) in section.components.iter().enumerate() {
            let last = ci + 1 == section.components.len();
            out.push_str(&format!(
                "{}{} {} {} {}{}\n",
                indent,
                if last { "└─" } else { "├─" },
                component.component_type().to_string().green(),
                component.id.to_string().dimmed(),
                summary(component),
                hidden_marker(component.visible)
            ));
        }
    }

    out
}

fn hidden_marker(visible: bool) -> String {
    if visible {
        String::new()
    } else {
        format!(" {}", "(hidden)".yellow())
    }
}

fn summary(component: &Component) -> String {
    match &component.content {
        ComponentContent::Heading { text, level } => format!("h{} {:?}", level, text),
        ComponentContent::Text { text } => format!("{:?}", text),
        ComponentContent::Button { label, .. } => format!("{:?}", label),
        ComponentContent::Image { src, .. } | ComponentContent::Video { src, .. } => src.clone(),
        ComponentContent::Icon { name, .. } => name.clone(),
        ComponentContent::Form { fields, .. } => format!("{} field(s)", fields.len()),
        ComponentContent::Custom { html } => format!("{} bytes of html", html.len()),
    }
}
