//! Frozen programs shared between threads

use std::thread;

use weft::checker::CheckerOptions;
use weft::http::route::{route_path, verb};
use weft::http::HttpVerb;

use crate::{check, widget_service};

#[test]
fn frozen_program_is_readable_from_many_threads() {
    let program = check(CheckerOptions::default(), &widget_service());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let program = program.clone();
            thread::spawn(move || {
                let list = program.lookup("Widgets.list").unwrap();
                (route_path(&program, list), verb(&program, list))
            })
        })
        .collect();
    for handle in handles {
        let (path, method) = handle.join().unwrap();
        assert_eq!(path, "/widgets");
        assert_eq!(method, HttpVerb::Get);
    }
}

#[test]
fn merged_namespace_sees_both_files() {
    let program = check(CheckerOptions::default(), &widget_service());
    assert!(program.lookup("Widgets.Widget.weight").is_some());
    assert!(program.lookup("Widgets.list.pageSize").is_some());
    let weight = program.lookup("Widgets.Widget.weight").unwrap();
    assert!(program.decl(weight).is_optional());
}
