//! Integration tests - Full pipeline from elements to the live DOM
//!
//! Tests the complete workflow: Element → Node tree → Patches → MemoryTarget → Events

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use recon_dom::{BuildError, EventKind, NodePath, PatchKind, StateError, TargetError};
use recon_engine::{
    h, text, Component, Config, EventHandler, Props, RenderError, Renderer, SetState,
    StatefulRenderer,
};
use recon_render::{MemoryTarget, MutationType};

fn counter() -> Component {
    Component::new("Counter", |_, hooks| {
        let (count, set_count) = hooks.use_state(0i64)?;
        let on_click = hooks.use_handler(move |_, _| {
            set_count.update(|n| n + 1)?;
            Ok(())
        })?;
        Ok(h(
            "div",
            Props::new(),
            vec![
                text(count.to_string()),
                h("button", Props::new().with("onClick", on_click), vec![text("+")]),
            ],
        ))
    })
}

fn ids(renderer: &Renderer) -> Vec<String> {
    let mut ids = Vec::new();
    if let Some(tree) = renderer.previous_tree() {
        tree.walk(&mut |node| ids.push(node.id().to_string()));
    }
    ids
}

// ============================================================================
// END-TO-END
// ============================================================================

#[test]
fn test_initial_render_single_create() {
    let target = MemoryTarget::new();
    let renderer = Renderer::new(target.clone()).unwrap();

    let report = renderer.render(&h("button", Props::new(), vec![text("Say Hi!")])).unwrap();

    assert_eq!(report.patches.len(), 1);
    assert_eq!(report.patches[0].kind(), PatchKind::Create);
    assert_eq!(report.patches[0].target(), &NodePath::root());
    assert_eq!(target.to_html(), r#"<button data-recon-id=".">Say Hi!</button>"#);
}

#[test]
fn test_counter_increment() {
    let target = MemoryTarget::new();
    let renderer = StatefulRenderer::new(target.clone()).unwrap();
    let counter = counter();

    renderer.render(&h(&counter, Props::new(), vec![])).unwrap();
    assert_eq!(renderer.passes(), 1);
    assert_eq!(
        target.to_html(),
        r#"<div data-recon-id=".">0<button data-recon-id=".1.">+</button></div>"#
    );
    target.take_records();

    let report = target.click(&".1.".parse().unwrap()).unwrap();
    assert_eq!(report.invoked, 1);

    // Exactly one extra cycle, rewriting only the text
    assert_eq!(renderer.passes(), 2);
    assert_eq!(
        target.to_html(),
        r#"<div data-recon-id=".">1<button data-recon-id=".1.">+</button></div>"#
    );
    let records = target.take_records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].mutation_type, MutationType::CharacterData);
    assert_eq!(Some(records[0].target), target.find(&".0.".parse().unwrap()));
}

#[test]
fn test_integer_text_leaf_renders_literal() {
    let numeric = Component::new("Numeric", |_, hooks| {
        let (count, set_count) = hooks.use_state(0i64)?;
        let on_click = hooks.use_handler(move |_, _| {
            set_count.update(|n| n + 1)?;
            Ok(())
        })?;
        Ok(h("button", Props::new().with("onClick", on_click), vec![text(count)]))
    });

    let target = MemoryTarget::new();
    let renderer = StatefulRenderer::new(target.clone()).unwrap();
    renderer.render(&h(&numeric, Props::new(), vec![])).unwrap();
    assert_eq!(target.to_html(), r#"<button data-recon-id=".">0</button>"#);

    target.click(&NodePath::root()).unwrap();
    assert_eq!(renderer.passes(), 2);
    assert_eq!(target.to_html(), r#"<button data-recon-id=".">1</button>"#);
}

#[test]
fn test_click_on_text_bubbles_to_button() {
    let target = MemoryTarget::new();
    let renderer = StatefulRenderer::new(target.clone()).unwrap();
    let counter = counter();
    renderer.render(&h(&counter, Props::new(), vec![])).unwrap();

    target.click(&".1.0.".parse().unwrap()).unwrap();
    target.click(&".1.0.".parse().unwrap()).unwrap();

    assert_eq!(renderer.passes(), 3);
    assert!(target.to_html().contains(">2<button"));
}

// ============================================================================
// MEMOIZATION & PATHS
// ============================================================================

#[test]
fn test_memoized_component_not_reinvoked() {
    let calls = Rc::new(Cell::new(0));
    let counter = calls.clone();
    let header = Component::new("Header", move |props, _| {
        counter.set(counter.get() + 1);
        Ok(h("h1", Props::new(), vec![text(props.get_str("title").unwrap_or_default())]))
    });
    let page = |body: &str| {
        h(
            "main",
            Props::new(),
            vec![h(&header, Props::new().with("title", "Recon"), vec![]), text(body)],
        )
    };

    let target = MemoryTarget::new();
    let renderer = Renderer::new(target.clone()).unwrap();
    renderer.render(&page("one")).unwrap();
    let report = renderer.render(&page("two")).unwrap();

    assert_eq!(calls.get(), 1);
    assert_eq!(renderer.memo_stats(&header).hits, 1);
    assert_eq!(report.patches.len(), 1);
    assert_eq!(report.patches[0].target().to_string(), ".1.");
    assert_eq!(
        target.to_html(),
        r#"<main data-recon-id="."><h1 data-recon-id=".0.">Recon</h1>two</main>"#
    );
}

#[test]
fn test_path_ids_stable_across_renders() {
    let renderer = Renderer::new(MemoryTarget::new()).unwrap();
    let tree = |label: &str| {
        h(
            "div",
            Props::new(),
            vec![h("ul", Props::new(), vec![text(label), text("b")]), h("p", Props::new(), vec![])],
        )
    };

    renderer.render(&tree("a")).unwrap();
    let first = ids(&renderer);
    renderer.render(&tree("z")).unwrap();

    assert_eq!(first, [".", ".0.", ".0.0.", ".0.1.", ".1."]);
    assert_eq!(ids(&renderer), first);
}

#[test]
fn test_type_change_replaces_subtree_in_place() {
    let target = MemoryTarget::new();
    let renderer = Renderer::new(target.clone()).unwrap();
    renderer
        .render(&h("div", Props::new(), vec![h("b", Props::new(), vec![text("x")]), text("y")]))
        .unwrap();
    let report = renderer
        .render(&h("div", Props::new(), vec![h("i", Props::new(), vec![text("x")]), text("y")]))
        .unwrap();

    assert_eq!(report.patches.len(), 1);
    assert_eq!(report.patches[0].kind(), PatchKind::Replace);
    assert_eq!(
        target.to_html(),
        r#"<div data-recon-id="."><i data-recon-id=".0.">x</i>y</div>"#
    );
}

// ============================================================================
// EVENTS
// ============================================================================

#[test]
fn test_bubbling_with_stop_propagation() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let handler = |name: &'static str, stop: bool| {
        let log = log.clone();
        EventHandler::new(move |_, propagation| {
            log.borrow_mut().push(name);
            if stop {
                propagation.stop();
            }
            Ok(())
        })
    };

    let target = MemoryTarget::new();
    let renderer = Renderer::new(target.clone()).unwrap();
    let tree = h(
        "div",
        Props::new().with("onClick", handler("outer", false)),
        vec![h(
            "section",
            Props::new().with("onClick", handler("middle", false)),
            vec![
                text("pad"),
                h("button", Props::new().with("onClick", handler("inner", false)), vec![]),
            ],
        )],
    );
    renderer.render(&tree).unwrap();

    target.click(&".0.1.".parse().unwrap()).unwrap();
    assert_eq!(*log.borrow(), ["inner", "middle", "outer"]);

    log.borrow_mut().clear();
    let stopping = h(
        "div",
        Props::new().with("onClick", handler("outer", false)),
        vec![h(
            "section",
            Props::new().with("onClick", handler("middle", true)),
            vec![
                text("pad"),
                h("button", Props::new().with("onClick", handler("inner", false)), vec![]),
            ],
        )],
    );
    renderer.render(&stopping).unwrap();

    let report = target.click(&".0.1.".parse().unwrap()).unwrap();
    assert_eq!(*log.borrow(), ["inner", "middle"]);
    assert!(report.stopped);
}

#[test]
fn test_removed_subtree_handlers_unregistered() {
    let fired = Rc::new(Cell::new(0));
    let count = fired.clone();
    let on_click = EventHandler::new(move |_, _| {
        count.set(count.get() + 1);
        Ok(())
    });

    let target = MemoryTarget::new();
    let renderer = Renderer::new(target.clone()).unwrap();
    renderer
        .render(&h(
            "div",
            Props::new(),
            vec![h("button", Props::new().with("onClick", on_click), vec![])],
        ))
        .unwrap();
    assert_eq!(renderer.dispatcher().handlers().borrow().len(), 1);

    renderer.render(&h("div", Props::new(), vec![])).unwrap();
    assert!(renderer.dispatcher().handlers().borrow().is_empty());
    assert!(matches!(
        target.click(&".0.".parse().unwrap()),
        Err(TargetError::MissingCorrelation(_))
    ));

    // Fired directly on the div, nothing is registered along the path
    let report = target.click(&NodePath::root()).unwrap();
    assert_eq!(report.invoked, 0);
    assert_eq!(fired.get(), 0);
}

#[test]
fn test_unattached_event_kind_ignored() {
    let target = MemoryTarget::new();
    let config = Config::default().with_events(Vec::<EventKind>::new());
    let renderer = Renderer::with_config(target.clone(), config).unwrap();
    let fired = Rc::new(Cell::new(false));
    let flag = fired.clone();
    renderer
        .render(&h(
            "button",
            Props::new().with(
                "onClick",
                EventHandler::new(move |_, _| {
                    flag.set(true);
                    Ok(())
                }),
            ),
            vec![],
        ))
        .unwrap();

    let root = target.find(&NodePath::root()).unwrap();
    let report = target.dispatch(EventKind::Click, root).unwrap();
    assert_eq!(report.invoked, 0);
    assert!(!fired.get());
}

// ============================================================================
// FAILURES
// ============================================================================

#[test]
fn test_aborted_pass_keeps_previous_tree() {
    let broken = Component::new("Broken", |_, _| anyhow::bail!("backend unavailable"));
    let target = MemoryTarget::new();
    let renderer = Renderer::new(target.clone()).unwrap();

    renderer.render(&h("p", Props::new(), vec![text("ok")])).unwrap();
    let committed = renderer.previous_tree().unwrap();

    let err = renderer
        .render(&h("p", Props::new(), vec![h(&broken, Props::new(), vec![])]))
        .unwrap_err();
    match err {
        RenderError::Build(BuildError::Component { component, path, .. }) => {
            assert_eq!(component, "Broken");
            assert_eq!(path.to_string(), ".0.");
        }
        other => panic!("unexpected error: {other}"),
    }

    assert!(Rc::ptr_eq(&renderer.previous_tree().unwrap(), &committed));
    assert_eq!(renderer.passes(), 1);
    assert_eq!(target.to_html(), r#"<p data-recon-id=".">ok</p>"#);

    // The next pass diffs against the last committed tree
    let report = renderer.render(&h("p", Props::new(), vec![text("fine")])).unwrap();
    assert_eq!(report.patches.len(), 1);
    assert_eq!(report.patches[0].kind(), PatchKind::ReplaceAttributes);
}

#[test]
fn test_setter_during_build_fails() {
    let eager = Component::new("Eager", |_, hooks| {
        let (value, set_value) = hooks.use_state(0i64)?;
        set_value.set(value + 1)?;
        Ok(text(value))
    });
    let renderer = StatefulRenderer::new(MemoryTarget::new()).unwrap();

    let err = renderer.render(&h(&eager, Props::new(), vec![])).unwrap_err();
    let RenderError::Build(BuildError::Component { source, .. }) = err else {
        panic!("expected a component failure");
    };
    assert!(matches!(
        source.downcast_ref::<StateError>(),
        Some(StateError::RenderInProgress)
    ));
    assert_eq!(renderer.passes(), 0);
}

#[test]
fn test_hooks_unavailable_in_stateless_renderer() {
    let renderer = Renderer::new(MemoryTarget::new()).unwrap();
    let err = renderer.render(&h(&counter(), Props::new(), vec![])).unwrap_err();

    let RenderError::Build(BuildError::Component { source, .. }) = err else {
        panic!("expected a component failure");
    };
    assert!(matches!(
        source.downcast_ref::<StateError>(),
        Some(StateError::HookUnavailable)
    ));
}

#[test]
fn test_nested_render_rejected() {
    let slot: Rc<RefCell<Option<Rc<Renderer>>>> = Rc::new(RefCell::new(None));
    let rejected = Rc::new(Cell::new(false));

    let inner_slot = slot.clone();
    let flag = rejected.clone();
    let nested = Component::new("Nested", move |_, _| {
        if let Some(renderer) = inner_slot.borrow().as_ref() {
            flag.set(matches!(renderer.render(&text("x")), Err(RenderError::RenderInProgress)));
        }
        Ok(text("outer"))
    });

    let renderer = Rc::new(Renderer::new(MemoryTarget::new()).unwrap());
    *slot.borrow_mut() = Some(renderer.clone());
    renderer.render(&h(&nested, Props::new(), vec![])).unwrap();

    assert!(rejected.get());
    assert_eq!(renderer.passes(), 1);
    slot.borrow_mut().take();
}

#[test]
fn test_setter_after_renderer_dropped() {
    let captured: Rc<RefCell<Option<SetState<i64>>>> = Rc::new(RefCell::new(None));
    let slot = captured.clone();
    let keeper = Component::new("Keeper", move |_, hooks| {
        let (value, set_value) = hooks.use_state(7i64)?;
        *slot.borrow_mut() = Some(set_value);
        Ok(text(value))
    });

    {
        let renderer = StatefulRenderer::new(MemoryTarget::new()).unwrap();
        renderer.render(&h(&keeper, Props::new(), vec![])).unwrap();
    }

    let set = captured.borrow().clone().unwrap();
    assert!(matches!(set.set(8), Err(StateError::HostDropped)));
}
