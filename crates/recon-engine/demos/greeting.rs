//! Example: Stateful greeting button

use recon_engine::{h, text, Component, Props, StatefulRenderer};
use recon_render::MemoryTarget;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Initialize logging, RUST_LOG=debug shows every pass
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let greeting = Component::new("Greeting", |props, hooks| {
        let (greeted, set_greeted) = hooks.use_state(false)?;
        let on_click = hooks.use_handler(move |_, _| {
            set_greeted.update(|greeted| !greeted)?;
            Ok(())
        })?;

        let name = props.get_str("name").unwrap_or("stranger");
        let label = if greeted { format!("Hi, {name}!") } else { "Say Hi!".to_string() };
        Ok(h("button", Props::new().with("onClick", on_click), vec![text(label)]))
    });

    let target = MemoryTarget::new();
    let renderer = StatefulRenderer::new(target.clone())?;
    renderer.render(&h(&greeting, Props::new().with("name", "Recon"), vec![]))?;
    println!("Recon v{} pass {}: {}", recon_engine::VERSION, renderer.passes(), target.to_html());

    for _ in 0..2 {
        target.click(&recon_engine::dom::NodePath::root())?;
        println!("pass {}: {}", renderer.passes(), target.to_html());
    }
    Ok(())
}
