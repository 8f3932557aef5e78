//! `colloquy tools`: list the tools the assistant can call.

pub fn run() -> anyhow::Result<()> {
    let config = super::load_config()?;
    let registry = colloquy_tools::build_registry(&config.tools)?;

    println!("{} tools registered:", registry.len());
    for def in registry.definitions() {
        println!();
        println!("  {}", def.name);
        println!("    {}", def.description);
        if let Some(props) = def.parameters["properties"].as_object() {
            let required: Vec<&str> = def.parameters["required"]
                .as_array()
                .map(|r| r.iter().filter_map(|v| v.as_str()).collect())
                .unwrap_or_default();
            for name in props.keys() {
                let marker = if required.contains(&name.as_str()) {
                    " (required)"
                } else {
                    ""
                };
                println!("    - {name}{marker}");
            }
        }
    }

    Ok(())
}
