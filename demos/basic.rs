//! Basic usage example for the rsytmpl library.
//!
//! This example shows how to pick a template from the built-in catalog, add a
//! template of your own and parse a stream of syslog lines.

use rsytmpl::{CompiledTemplate, ParserRegistry, Reader, Selector, TemplateCatalog};
use std::io::Cursor;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== rsytmpl Basic Usage Example ===\n");

    // Example 1: The default template
    default_template_example()?;

    // Example 2: Adding a template to the catalog
    custom_template_example()?;

    // Example 3: Error handling
    error_handling_example()?;

    Ok(())
}

/// Example 1: parse syslog lines with TraditionalFileFormat
fn default_template_example() -> Result<(), Box<dyn std::error::Error>> {
    println!("1. Default Template");
    println!("-------------------");

    let catalog = TemplateCatalog::builtin()?;
    catalog.print_avail_templates(&mut std::io::stdout())?;

    let registry = ParserRegistry::from_catalog(&catalog);
    let template = registry.create_selected(&catalog, &Selector::Default)?;
    println!("Template: {} {}", template.name(), template.template());
    println!("Regex:    {}", template.regex());
    println!();

    let log_data = "Oct 11 14:01:13 myhost sshd[1234]: Accepted password for alice
Oct 11 14:01:20 myhost sudo:    alice : TTY=pts/0 ; COMMAND=/bin/ls
not a syslog line
Oct 11 14:02:00 10.0.0.7 CRON[99]: (root) CMD (run-parts /etc/cron.hourly)";

    let mut reader = Reader::new(Cursor::new(log_data), template);
    for result in reader.by_ref() {
        let record = result?;
        if record.is_empty() {
            println!("  (no match)");
            continue;
        }
        println!(
            "  {} | {} | {} |{}",
            record.field("TIMESTAMP")?,
            record.field("HOSTNAME")?,
            record.field("syslogtag")?,
            record.field("msg")?
        );
    }

    let stats = reader.stats();
    println!(
        "\n{} lines, {} matched, {} unmatched\n\n",
        stats.lines, stats.matched, stats.unmatched
    );
    Ok(())
}

/// Example 2: extend the catalog and use the new template by number
fn custom_template_example() -> Result<(), Box<dyn std::error::Error>> {
    println!("2. Custom Template");
    println!("------------------");

    let mut catalog = TemplateCatalog::builtin()?;
    let mut registry = ParserRegistry::from_catalog(&catalog);
    let added = catalog.extend(
        r#"#$template Forwarded,"%PRI%%TIMESTAMP% %HOSTNAME% %syslogtag%%msg%""#.as_bytes(),
    )?;
    registry.register_new(&catalog, &added)?;

    let number = catalog.get("Forwarded")?.ordinal;
    println!("Added {:?} as template #{}", added, number);

    let template = registry.create_selected(&catalog, &Selector::Index(number))?;
    let record = template.parse("<86>Oct 11 14:01:13 gateway dropbear[77]: Password auth succeeded");
    for (name, value) in record.iter() {
        println!("  {:<10} {:?}", name, value);
    }

    println!("\n");
    Ok(())
}

/// Example 3: what goes wrong and how it is reported
fn error_handling_example() -> Result<(), Box<dyn std::error::Error>> {
    println!("3. Error Handling");
    println!("-----------------");

    for (name, body) in [
        ("json", r#"{"msg":"%msg%"}"#),
        ("unknown", "%TIMESTAMP% %APP-NAME%"),
        ("tail", "%TIMESTAMP% trailing text"),
    ] {
        match CompiledTemplate::new(name, body, None) {
            Ok(_) => println!("  {}: unexpected success", name),
            Err(e) => println!("  {}: {}", name, e),
        }
    }

    let template = CompiledTemplate::new("numbered", "%NUM% %msg%", None)?;
    match template.try_parse("no number here") {
        Ok(_) => println!("  try_parse: unexpected success"),
        Err(e) => println!("  try_parse: {}", e),
    }
    println!("  parse: {:?}", template.parse("no number here"));

    println!("\n");
    Ok(())
}
