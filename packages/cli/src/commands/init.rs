use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use pagebuilder_editor::{EditorConfig, FileGateway, PersistenceGateway, DEFAULT_CONFIG_NAME};
use pagebuilder_model::{
    Component, ComponentContent, IdGenerator, PageDocument, PageId, Section, SectionKind, Styles,
    TextAlign,
};
use std::fs;
use std::path::Path;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Id of the starter page to create
    #[arg(short, long, default_value = "home")]
    pub page: String,

    /// Directory holding page documents
    #[arg(long, default_value = "pages")]
    pub pages_dir: String,

    /// Force overwrite existing config and page
    #[arg(short, long)]
    pub force: bool,
}

pub async fn init(args: InitArgs, cwd: &Path) -> Result<()> {
    let config_path = cwd.join(DEFAULT_CONFIG_NAME);

    // Check if config already exists
    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!(
        "{}",
        "📝 Initializing page builder project...".bright_blue().bold()
    );

    let config = EditorConfig {
        pages_dir: args.pages_dir.clone(),
        ..EditorConfig::default()
    };

    let config_json = serde_json::to_string_pretty(&config)?;
    fs::write(&config_path, config_json)
        .with_context(|| format!("writing {}", config_path.display()))?;
    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);

    let page_id = PageId::from(args.page.as_str());
    let gateway = FileGateway::new(config.get_pages_dir(cwd));
    let page_path = gateway.path_for(&page_id)?;

    if page_path.exists() && !args.force {
        println!(
            "  {} {} already exists, leaving it untouched",
            "⚠️".yellow(),
            page_path.display()
        );
    } else {
        let doc = starter_page(&page_id);
        gateway.save(&page_id, &doc).await?;
        println!(
            "  {} Created {}/{} ({} sections, {} components)",
            "✓".green(),
            args.pages_dir,
            page_path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            doc.section_count(),
            doc.component_count()
        );
    }

    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Run: pagebuilder inspect --page {}", args.page);
    println!("  2. Record edits as JSON lines in edits.jsonl");
    println!("  3. Run: pagebuilder replay edits.jsonl --page {} --save", args.page);

    Ok(())
}

/// A small header / hero / footer page with ids allocated for `page_id`
pub fn starter_page(page_id: &PageId) -> PageDocument {
    let mut ids = IdGenerator::new(page_id.as_str());

    let header = Section::new(SectionKind::Header)
        .with_id(ids.new_id())
        .with_component(
            Component::new(ComponentContent::heading("My Site", 2)).with_id(ids.new_id()),
        );

    let hero = Section::new(SectionKind::Hero)
        .with_id(ids.new_id())
        .with_styles(Styles::default().with_padding("64px 24px").with_text_align(TextAlign::Center))
        .with_component(
            Component::new(ComponentContent::heading("Build pages faster", 1)).with_id(ids.new_id()),
        )
        .with_component(
            Component::new(ComponentContent::text("Drag sections and components into place."))
                .with_id(ids.new_id()),
        )
        .with_component(
            Component::new(ComponentContent::Button {
                label: "Get started".to_string(),
                href: Some("/signup".to_string()),
            })
            .with_id(ids.new_id())
            .with_styles(Styles::default().with_background("#3366FF").with_color("#FFFFFF")),
        );

    let footer = Section::new(SectionKind::Footer)
        .with_id(ids.new_id())
        .with_component(
            Component::new(ComponentContent::text("© My Site")).with_id(ids.new_id()),
        );

    PageDocument::from_sections(vec![header, hero, footer])
}
