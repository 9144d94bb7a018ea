//! The construction-time extraction pass.
//!
//! For every class in the lineage, root first, specs consume their share of
//! the construction input in a fixed order: positional specs without the
//! after-options flag, then option specs, then the after-options positional
//! specs. Specs deeper in the lineage therefore see only what their ancestors
//! left behind. Whatever survives the whole pass stays with the element as
//! leftover arguments and plain html attributes.

use crate::args::spec::{ArgumentSpec, OptionSpec, SpecFlags};
use crate::capture::CaptureList;
use crate::condition::matches_with;
use crate::element::Element;
use crate::render::RenderContext;
use crate::value::{OptionsMap, Value};

/// Run the extraction pass for `element`'s class lineage over the given
/// construction input. `args` and `opts` are consumed in place; what remains
/// afterwards was claimed by no spec.
pub(crate) fn resolve(
    element: &mut Element,
    ctx: &mut dyn RenderContext,
    args: &mut CaptureList,
    opts: &mut OptionsMap,
) {
    let lineage = element.class().lineage_arcs();
    for class in lineage.iter().rev() {
        let mut early: Vec<ArgumentSpec> = Vec::new();
        let mut late: Vec<ArgumentSpec> = Vec::new();
        for spec in &class.arguments {
            if spec.flags.contains(SpecFlags::AFTER_OPTIONS) {
                late.push(spec.clone());
            } else {
                early.push(spec.clone());
            }
        }
        let options: Vec<OptionSpec> = class.options.clone();

        extract_arguments(element, ctx, args, &early);
        extract_options(element, ctx, opts, &options);
        extract_arguments(element, ctx, args, &late);
    }
}

fn extract_arguments(
    element: &mut Element,
    ctx: &mut dyn RenderContext,
    args: &mut CaptureList,
    specs: &[ArgumentSpec],
) {
    for spec in specs {
        // Conditions see the element, so they can depend on state resolved
        // earlier in the same pass.
        let conditions = &spec.conditions;
        let captured: Vec<Value> = if spec.flags.contains(SpecFlags::FIRST_ONLY) {
            args.capture_first_with(|value| matches_with(&*element, value, conditions))
                .into_iter()
                .collect()
        } else {
            args.capture_with(|value| matches_with(&*element, value, conditions))
        };
        if captured.is_empty() {
            continue;
        }
        element.record_provided_argument(&spec.name, &captured);
        for value in captured {
            dispatch(element, ctx, &spec.name, spec.callback.clone(), value);
        }
    }
}

fn extract_options(
    element: &mut Element,
    ctx: &mut dyn RenderContext,
    opts: &mut OptionsMap,
    specs: &[OptionSpec],
) {
    for spec in specs {
        // Conditions see option keys as symbols, so default name conditions
        // and key patterns both apply.
        let matched: Vec<String> = opts
            .keys()
            .filter(|key| {
                matches_with(&*element, &Value::Symbol((*key).to_owned()), &spec.conditions)
            })
            .map(str::to_owned)
            .collect();
        for key in matched {
            if let Some(value) = opts.remove(&key) {
                element.record_provided_option(&spec.name, &key, value.clone());
                dispatch(element, ctx, &spec.name, spec.callback.clone(), value);
            }
        }
    }
}

fn dispatch(
    element: &mut Element,
    ctx: &mut dyn RenderContext,
    name: &str,
    callback: Option<crate::args::spec::SpecCallback>,
    value: Value,
) {
    if let Some(callback) = callback {
        callback(element, ctx, name, value);
    } else if let Some(setter) = element.class().find_setter(name) {
        setter(element, value);
    }
    // No callback and no setter: the capture is recorded and the value
    // simply leaves the input.
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use crate::class::{ClassBuilder, ComponentClass};
    use crate::condition::Condition;
    use crate::element::{Element, ElementInput};
    use crate::testing::HtmlContext;
    use crate::value::{sym, Kind, OptionsMap, Value};
    use crate::args::spec::SpecFlags;

    fn log() -> (Arc<Mutex<Vec<String>>>, Arc<Mutex<Vec<String>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        (log.clone(), log)
    }

    #[test]
    fn argument_spec_dispatches_to_setter() {
        let (log, sink) = log();
        let base = ComponentClass::base();
        let class = ComponentClass::derive("c", &base)
            .argument(
                "size",
                vec![Condition::OneOf(vec![sym("small"), sym("large")])],
                SpecFlags::default(),
            )
            .setter("size", move |_el, value| {
                sink.lock().unwrap().push(value.text());
            })
            .build()
            .unwrap();
        let mut ctx = HtmlContext::new();
        Element::new(class, &mut ctx, ElementInput::new().arg(sym("large")));
        assert_eq!(*log.lock().unwrap(), vec!["large".to_owned()]);
    }

    #[test]
    fn option_spec_consumes_the_key() {
        let base = ComponentClass::base();
        let class = ComponentClass::derive("c", &base)
            .option("size", vec![])
            .setter("size", |_el, _value| {})
            .build()
            .unwrap();
        let mut ctx = HtmlContext::new();
        let el = Element::new(
            class,
            &mut ctx,
            ElementInput::new().opt("size", sym("large")).opt("id", "x"),
        );
        // Consumed by the spec, so not an attribute.
        assert!(!el.attrs().contains_key("size"));
        assert!(el.attrs().contains_key("id"));
        assert!(el.option_provided("size"));
        assert!(!el.option_provided("id"));
    }

    #[test]
    fn unmatched_input_becomes_leftovers_and_attrs() {
        let base = ComponentClass::base();
        let class = ComponentClass::derive("c", &base).build().unwrap();
        let mut ctx = HtmlContext::new();
        let el = Element::new(
            class,
            &mut ctx,
            ElementInput::new().arg(sym("stray")).opt("id", "x"),
        );
        assert_eq!(el.leftover_args(), &[sym("stray")]);
        assert_eq!(el.attrs().get("id"), Some(&Value::from("x")));
    }

    #[test]
    fn first_only_takes_a_single_value() {
        let count = Arc::new(AtomicUsize::new(0));
        let sink = count.clone();
        let base = ComponentClass::base();
        let class = ComponentClass::derive("c", &base)
            .argument_with(
                "num",
                vec![Condition::OfKind(Kind::Int)],
                SpecFlags::FIRST_ONLY,
                move |_el, _ctx, _name, _value| {
                    sink.fetch_add(1, Ordering::SeqCst);
                },
            )
            .build()
            .unwrap();
        let mut ctx = HtmlContext::new();
        let el = Element::new(
            class,
            &mut ctx,
            ElementInput::new().arg(Value::Int(1)).arg(Value::Int(2)),
        );
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(el.leftover_args(), &[Value::Int(2)]);
    }

    #[test]
    fn after_options_specs_run_after_option_specs() {
        let (log, args_sink) = log();
        let opts_sink = log.clone();
        let base = ComponentClass::base();
        let class = ComponentClass::derive("c", &base)
            .argument_with(
                "late",
                vec![Condition::OfKind(Kind::Symbol)],
                SpecFlags::AFTER_OPTIONS,
                move |_el, _ctx, _name, _value| {
                    args_sink.lock().unwrap().push("arg".to_owned());
                },
            )
            .option_with("mode", vec![], move |_el, _ctx, _name, _value| {
                opts_sink.lock().unwrap().push("opt".to_owned());
            })
            .build()
            .unwrap();
        let mut ctx = HtmlContext::new();
        Element::new(
            class,
            &mut ctx,
            ElementInput::new().arg(sym("x")).opt("mode", sym("fast")),
        );
        assert_eq!(*log.lock().unwrap(), vec!["opt".to_owned(), "arg".to_owned()]);
    }

    #[test]
    fn ancestors_extract_before_descendants() {
        let (log, base_sink) = log();
        let sub_sink = log.clone();
        let base = ClassBuilder::root("base")
            .section(&["content"])
            .argument_with(
                "any",
                vec![Condition::OfKind(Kind::Symbol)],
                SpecFlags::FIRST_ONLY,
                move |_el, _ctx, _name, value| {
                    base_sink.lock().unwrap().push(format!("base:{}", value.text()));
                },
            )
            .build()
            .unwrap();
        let sub = ComponentClass::derive("sub", &base)
            .argument_with(
                "rest",
                vec![Condition::OfKind(Kind::Symbol)],
                SpecFlags::default(),
                move |_el, _ctx, _name, value| {
                    sub_sink.lock().unwrap().push(format!("sub:{}", value.text()));
                },
            )
            .build()
            .unwrap();
        let mut ctx = HtmlContext::new();
        Element::new(
            sub,
            &mut ctx,
            ElementInput::new().arg(sym("a")).arg(sym("b")),
        );
        // The base spec claims the first symbol; the subclass sees the rest.
        assert_eq!(
            *log.lock().unwrap(),
            vec!["base:a".to_owned(), "sub:b".to_owned()]
        );
    }

    #[test]
    fn shared_name_matches_argument_and_option() {
        let (log, sink) = log();
        let base = ComponentClass::base();
        let class = ComponentClass::derive("c", &base)
            .argument(
                "size",
                vec![Condition::OneOf(vec![sym("small"), sym("large")])],
                SpecFlags::default(),
            )
            .option("size", vec![])
            .setter("size", move |_el, value| {
                sink.lock().unwrap().push(value.text());
            })
            .build()
            .unwrap();
        let mut ctx = HtmlContext::new();
        let el = Element::new(
            class.clone(),
            &mut ctx,
            ElementInput::new().arg(sym("large")),
        );
        assert!(el.argument_provided("size"));
        let el = Element::new(
            class,
            &mut ctx,
            ElementInput::new().opt("size", sym("small")),
        );
        assert!(el.option_provided("size"));
        assert_eq!(
            *log.lock().unwrap(),
            vec!["large".to_owned(), "small".to_owned()]
        );
    }

    #[test]
    fn state_conditions_depend_on_resolved_options() {
        use crate::condition::Condition;

        // The symbol argument only applies once the `mode` option was seen.
        let base = ComponentClass::base();
        let class = ComponentClass::derive("c", &base)
            .option("mode", vec![])
            .argument_with(
                "variant",
                vec![
                    Condition::OfKind(Kind::Symbol),
                    Condition::All(vec![Condition::state(|el, _value| {
                        el.option_provided("mode")
                    })]),
                ],
                SpecFlags::FIRST_ONLY | SpecFlags::AFTER_OPTIONS,
                |el, _ctx, _name, value| {
                    let name = value.text();
                    el.add_html_class(&name);
                },
            )
            .build()
            .unwrap();

        let mut ctx = HtmlContext::new();
        let el = Element::new(
            class.clone(),
            &mut ctx,
            ElementInput::new().arg(sym("wide")).opt("mode", sym("on")),
        );
        assert!(el.has_html_class("wide"));

        let el = Element::new(class, &mut ctx, ElementInput::new().arg(sym("wide")));
        assert!(!el.has_html_class("wide"));
        assert_eq!(el.leftover_args(), &[sym("wide")]);
    }

    #[test]
    fn pattern_option_conditions_match_key_families() {
        let captured = Arc::new(Mutex::new(OptionsMap::new()));
        let sink = captured.clone();
        let base = ComponentClass::base();
        let class = ComponentClass::derive("c", &base)
            .option_with(
                "data",
                vec![Condition::pattern("data_*")],
                move |_el, _ctx, _name, value| {
                    sink.lock().unwrap().insert(value.text(), Value::Bool(true));
                },
            )
            .build()
            .unwrap();
        let mut ctx = HtmlContext::new();
        let el = Element::new(
            class,
            &mut ctx,
            ElementInput::new()
                .opt("data_id", "1")
                .opt("data_role", "r")
                .opt("id", "x"),
        );
        assert_eq!(captured.lock().unwrap().len(), 2);
        assert!(el.attrs().contains_key("id"));
        assert!(!el.attrs().contains_key("data_id"));
    }
}
