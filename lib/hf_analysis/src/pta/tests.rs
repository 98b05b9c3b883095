use super::*;
use crate::errors::AnalysisError;
use crate::pta::pts::PointsToSet;
use hf_ir::load_program_str;
use hf_ir::repo::{MethodUid, VarUid};
use hf_ir::types::Subsignature;
use std::collections::BTreeSet;
use std::convert::TryFrom;

fn method(program: &Program, class: &str, sig: &str) -> MethodUid {
    program
        .get_method(class, &Subsignature::try_from(sig).unwrap())
        .unwrap()
        .uid()
}

fn var(program: &Program, class: &str, sig: &str, name: &str) -> VarUid {
    let method = method(program, class, sig);
    program.get_var(method, name).unwrap().uid()
}

fn main_var(program: &Program, name: &str) -> VarUid {
    var(program, "Main", "main()V", name)
}

/// Names of the allocated types a variable may point to.
fn types_of(result: &PointerAnalysisResult<'_>, var: VarUid) -> BTreeSet<String> {
    result
        .var_points_to(var)
        .into_iter()
        .map(|obj| result.object(obj).type_().to_java_string())
        .collect()
}

fn set(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|name| (*name).to_string()).collect()
}

fn run<'p>(program: &'p Program, sensitivity: &str) -> PointerAnalysisResult<'p> {
    analyze(program, PtaOptions::new(sensitivity.parse().unwrap())).unwrap()
}

fn assert_fixpoint(result: &PointerAnalysisResult<'_>) {
    for (source, target) in result.flow_edges() {
        let target_pts = result.points_to(target);
        for obj in result.points_to(source).iter() {
            assert!(target_pts.contains(obj));
        }
    }
    let cg = result.call_graph();
    assert!(cg.edges().all(|edge| cg.contains(edge.callee())));
    let reachable: Vec<_> = cg.reachable_methods().collect();
    let unique: BTreeSet<_> = reachable.iter().copied().collect();
    assert_eq!(reachable.len(), unique.len());
}

#[test]
fn copy_propagation() {
    let program = load_program_str(
        r#"{
        "entry": { "class": "Main", "method": "main()V" },
        "classes": [
            { "name": "A" },
            { "name": "Main", "methods": [{
                "signature": "main()V", "static": true,
                "locals": [{ "name": "x", "type": "LA;" }, { "name": "y", "type": "LA;" }],
                "body": [
                    { "op": "new", "target": "x", "type": "LA;" },
                    { "op": "copy", "target": "y", "source": "x" }
                ]
            }] }
        ]
    }"#,
    )
    .unwrap();
    let result = run(&program, "ci");
    let (x, y) = (main_var(&program, "x"), main_var(&program, "y"));
    assert_eq!(result.var_points_to(x).len(), 1);
    assert_eq!(result.var_points_to(x), result.var_points_to(y));
    assert_eq!(
        result.var_points_to_sites(y),
        [program[method(&program, "Main", "main()V")].statements()[0]]
            .into_iter()
            .collect()
    );
    assert_fixpoint(&result);
}

const DISPATCH: &str = r#"{
    "entry": { "class": "Main", "method": "main()V" },
    "classes": [
        {
            "name": "A",
            "methods": [{
                "signature": "m()LA;",
                "locals": [{ "name": "r", "type": "LA;" }],
                "body": [
                    { "op": "new", "target": "r", "type": "LA;" },
                    { "op": "return", "value": "r" }
                ]
            }]
        },
        {
            "name": "B", "superclass": "A",
            "methods": [{
                "signature": "m()LA;",
                "body": [{ "op": "return", "value": "this" }]
            }]
        },
        { "name": "Main", "methods": [{
            "signature": "main()V", "static": true,
            "locals": [{ "name": "x", "type": "LA;" }, { "name": "y", "type": "LA;" }],
            "body": [
                { "op": "new", "target": "x", "type": "LB;" },
                { "op": "invoke", "kind": "virtual", "method": "A.m()LA;", "receiver": "x", "result": "y" }
            ]
        }] }
    ]
}"#;

#[test]
fn dispatch_picks_the_override() {
    let program = load_program_str(DISPATCH).unwrap();
    let result = run(&program, "ci");
    let main = method(&program, "Main", "main()V");
    let call = program[main].call_sites()[0];
    let a_m = method(&program, "A", "m()LA;");
    let b_m = method(&program, "B", "m()LA;");

    let cg = result.ci_call_graph();
    assert_eq!(cg.callees_of(call).collect::<Vec<_>>(), vec![b_m]);
    assert!(cg.contains(b_m));
    assert!(!cg.contains(a_m));
    // B.m returns its receiver
    assert_eq!(types_of(&result, main_var(&program, "y")), set(&["B"]));
    assert_eq!(
        types_of(&result, program[b_m].this().unwrap()),
        set(&["B"])
    );
    assert_fixpoint(&result);
}

const IDENTITY: &str = r#"{
    "entry": { "class": "Main", "method": "main()V" },
    "classes": [
        { "name": "A", "methods": [{ "signature": "m()V", "body": [{ "op": "return" }] }] },
        {
            "name": "B", "superclass": "A",
            "methods": [{ "signature": "m()V", "body": [{ "op": "return" }] }]
        },
        { "name": "Main", "methods": [
            {
                "signature": "id(LA;)LA;", "static": true, "params": ["p"],
                "body": [{ "op": "return", "value": "p" }]
            },
            {
                "signature": "main()V", "static": true,
                "locals": [
                    { "name": "a", "type": "LA;" }, { "name": "b", "type": "LA;" },
                    { "name": "ra", "type": "LA;" }, { "name": "rb", "type": "LA;" }
                ],
                "body": [
                    { "op": "new", "target": "a", "type": "LA;" },
                    { "op": "new", "target": "b", "type": "LB;" },
                    { "op": "invoke", "kind": "static", "method": "Main.id(LA;)LA;", "args": ["a"], "result": "ra" },
                    { "op": "invoke", "kind": "static", "method": "Main.id(LA;)LA;", "args": ["b"], "result": "rb" },
                    { "op": "invoke", "kind": "virtual", "method": "A.m()V", "receiver": "ra" }
                ]
            }
        ] }
    ]
}"#;

#[test]
fn call_site_sensitivity_separates_contexts() {
    let program = load_program_str(IDENTITY).unwrap();
    let main = method(&program, "Main", "main()V");
    let id = method(&program, "Main", "id(LA;)LA;");
    let call = program[main].call_sites()[2];
    let a_m = method(&program, "A", "m()V");
    let b_m = method(&program, "B", "m()V");
    let (ra, rb) = (main_var(&program, "ra"), main_var(&program, "rb"));

    let ci = run(&program, "ci");
    assert_eq!(types_of(&ci, ra), set(&["A", "B"]));
    assert_eq!(types_of(&ci, rb), set(&["A", "B"]));
    assert_eq!(ci.contexts_of(id).len(), 1);
    assert_eq!(
        ci.ci_call_graph().callees_of(call).collect::<Vec<_>>(),
        vec![a_m, b_m]
    );

    let cs = run(&program, "1-call");
    assert_eq!(types_of(&cs, ra), set(&["A"]));
    assert_eq!(types_of(&cs, rb), set(&["B"]));
    assert_eq!(cs.contexts_of(id).len(), 2);
    // merged over both contexts of id
    assert_eq!(
        types_of(&cs, var(&program, "Main", "id(LA;)LA;", "p")),
        set(&["A", "B"])
    );
    assert_eq!(
        cs.ci_call_graph().callees_of(call).collect::<Vec<_>>(),
        vec![a_m]
    );
    assert_fixpoint(&cs);
}

#[test]
fn heap_contexts_split_objects() {
    let program = load_program_str(
        r#"{
        "entry": { "class": "Main", "method": "main()V" },
        "classes": [
            { "name": "A" },
            { "name": "Main", "methods": [
                {
                    "signature": "make()LA;", "static": true,
                    "locals": [{ "name": "o", "type": "LA;" }],
                    "body": [
                        { "op": "new", "target": "o", "type": "LA;" },
                        { "op": "return", "value": "o" }
                    ]
                },
                {
                    "signature": "main()V", "static": true,
                    "locals": [{ "name": "x", "type": "LA;" }, { "name": "y", "type": "LA;" }],
                    "body": [
                        { "op": "invoke", "kind": "static", "method": "Main.make()LA;", "result": "x" },
                        { "op": "invoke", "kind": "static", "method": "Main.make()LA;", "result": "y" }
                    ]
                }
            ] }
        ]
    }"#,
    )
    .unwrap();
    let (x, y) = (main_var(&program, "x"), main_var(&program, "y"));

    // no allocation in main: objects flow back through static calls only
    let ci = run(&program, "ci");
    assert_eq!(types_of(&ci, x), set(&["A"]));
    assert_eq!(ci.stats().objects, 1);
    assert_eq!(ci.stats().cs_objects, 1);

    let cs = run(&program, "2-call");
    assert_eq!(cs.stats().objects, 1);
    assert_eq!(cs.stats().cs_objects, 2);
    let main_ctx = cs.contexts_of(method(&program, "Main", "main()V"))[0];
    let x_pts = cs.cs_var_points_to(main_ctx, x).unwrap();
    let y_pts = cs.cs_var_points_to(main_ctx, y).unwrap();
    assert_eq!(x_pts.len(), 1);
    assert_eq!(y_pts.len(), 1);
    assert!(x_pts.iter().all(|obj| !y_pts.contains(obj)));
    // both objects come from the same allocation site
    assert_eq!(cs.var_points_to(x), cs.var_points_to(y));
}

const BOXES: &str = r#"{
    "entry": { "class": "Main", "method": "main()V" },
    "classes": [
        { "name": "A" },
        { "name": "C" },
        {
            "name": "Box",
            "fields": [{ "name": "f", "type": "Ljava/lang/Object;" }],
            "methods": [
                {
                    "signature": "set(Ljava/lang/Object;)V", "params": ["v"],
                    "body": [
                        { "op": "store", "base": "this", "field": "Box.f", "source": "v" },
                        { "op": "return" }
                    ]
                },
                {
                    "signature": "get()Ljava/lang/Object;",
                    "locals": [{ "name": "r", "type": "Ljava/lang/Object;" }],
                    "body": [
                        { "op": "load", "target": "r", "base": "this", "field": "Box.f" },
                        { "op": "return", "value": "r" }
                    ]
                }
            ]
        },
        { "name": "Main", "methods": [{
            "signature": "main()V", "static": true,
            "locals": [
                { "name": "b1", "type": "LBox;" }, { "name": "b2", "type": "LBox;" },
                { "name": "a", "type": "LA;" }, { "name": "c", "type": "LC;" },
                { "name": "r1", "type": "Ljava/lang/Object;" },
                { "name": "r2", "type": "Ljava/lang/Object;" }
            ],
            "body": [
                { "op": "new", "target": "b1", "type": "LBox;" },
                { "op": "new", "target": "b2", "type": "LBox;" },
                { "op": "new", "target": "a", "type": "LA;" },
                { "op": "new", "target": "c", "type": "LC;" },
                { "op": "invoke", "kind": "virtual", "method": "Box.set(Ljava/lang/Object;)V", "receiver": "b1", "args": ["a"] },
                { "op": "invoke", "kind": "virtual", "method": "Box.set(Ljava/lang/Object;)V", "receiver": "b2", "args": ["c"] },
                { "op": "invoke", "kind": "virtual", "method": "Box.get()Ljava/lang/Object;", "receiver": "b1", "result": "r1" },
                { "op": "invoke", "kind": "virtual", "method": "Box.get()Ljava/lang/Object;", "receiver": "b2", "result": "r2" }
            ]
        }] }
    ]
}"#;

#[test]
fn object_sensitivity_separates_receivers() {
    let program = load_program_str(BOXES).unwrap();
    let (r1, r2) = (main_var(&program, "r1"), main_var(&program, "r2"));
    let set_method = method(&program, "Box", "set(Ljava/lang/Object;)V");

    let ci = run(&program, "ci");
    assert_eq!(types_of(&ci, r1), set(&["A", "C"]));
    assert_eq!(types_of(&ci, r2), set(&["A", "C"]));

    for sensitivity in ["1-obj", "2-obj"] {
        let cs = run(&program, sensitivity);
        assert_eq!(types_of(&cs, r1), set(&["A"]));
        assert_eq!(types_of(&cs, r2), set(&["C"]));
        assert_eq!(cs.contexts_of(set_method).len(), 2);
        assert_fixpoint(&cs);
    }

    // both boxes are allocated in Main: one type context only
    let ty = run(&program, "1-type");
    assert_eq!(types_of(&ty, r1), set(&["A", "C"]));
    assert_eq!(ty.contexts_of(set_method).len(), 1);
    assert_fixpoint(&ty);
}

#[test]
fn field_aliasing() {
    let program = load_program_str(
        r#"{
        "entry": { "class": "Main", "method": "main()V" },
        "classes": [
            { "name": "A" },
            { "name": "Node", "fields": [{ "name": "f", "type": "LA;" }] },
            { "name": "Main", "methods": [{
                "signature": "main()V", "static": true,
                "locals": [
                    { "name": "x", "type": "LNode;" }, { "name": "w", "type": "LNode;" },
                    { "name": "y", "type": "LA;" }, { "name": "z", "type": "LA;" },
                    { "name": "x2", "type": "LNode;" }, { "name": "w2", "type": "LNode;" },
                    { "name": "y2", "type": "LA;" }, { "name": "z2", "type": "LA;" }
                ],
                "body": [
                    { "op": "load", "target": "z", "base": "w", "field": "Node.f" },
                    { "op": "store", "base": "x", "field": "Node.f", "source": "y" },
                    { "op": "new", "target": "x", "type": "LNode;" },
                    { "op": "copy", "target": "w", "source": "x" },
                    { "op": "new", "target": "y", "type": "LA;" },
                    { "op": "new", "target": "x2", "type": "LNode;" },
                    { "op": "new", "target": "w2", "type": "LNode;" },
                    { "op": "new", "target": "y2", "type": "LA;" },
                    { "op": "store", "base": "x2", "field": "Node.f", "source": "y2" },
                    { "op": "load", "target": "z2", "base": "w2", "field": "Node.f" }
                ]
            }] }
        ]
    }"#,
    )
    .unwrap();
    let result = run(&program, "ci");
    let z = main_var(&program, "z");
    let y = main_var(&program, "y");
    assert!(!result.var_points_to(z).is_empty());
    assert_eq!(result.var_points_to(z), result.var_points_to(y));
    assert!(result.var_points_to(main_var(&program, "z2")).is_empty());

    let f = program
        .get_class_by_name("Node")
        .unwrap()
        .get_field("f", &program)
        .unwrap()
        .uid();
    let node = *result
        .var_points_to(main_var(&program, "x"))
        .iter()
        .next()
        .unwrap();
    assert_eq!(result.object_field_points_to(node, f), result.var_points_to(y));

    let main_ctx = result.contexts_of(method(&program, "Main", "main()V"))[0];
    let cs_node = result
        .cs_var_points_to(main_ctx, main_var(&program, "x"))
        .unwrap()
        .iter()
        .next()
        .unwrap();
    let stored: Vec<_> = result
        .instance_field_points_to(cs_node, f)
        .unwrap()
        .iter()
        .collect();
    let y_pts: Vec<_> = result.cs_var_points_to(main_ctx, y).unwrap().iter().collect();
    assert_eq!(stored, y_pts);
    let cs_other = result
        .cs_var_points_to(main_ctx, main_var(&program, "w2"))
        .unwrap()
        .iter()
        .next()
        .unwrap();
    assert!(result
        .instance_field_points_to(cs_other, f)
        .map_or(true, PointsToSet::is_empty));
    assert_fixpoint(&result);
}

#[test]
fn late_edges_receive_known_objects() {
    // `a -> v` is only wired once the receiver object of `b` is processed,
    // when `a` already points to its object
    let program = load_program_str(
        r#"{
        "entry": { "class": "Main", "method": "main()V" },
        "classes": [
            { "name": "A" },
            {
                "name": "Box",
                "methods": [{
                    "signature": "id(LA;)LA;", "params": ["v"],
                    "body": [{ "op": "return", "value": "v" }]
                }]
            },
            { "name": "Main", "methods": [{
                "signature": "main()V", "static": true,
                "locals": [
                    { "name": "a", "type": "LA;" }, { "name": "b", "type": "LBox;" },
                    { "name": "r", "type": "LA;" }
                ],
                "body": [
                    { "op": "new", "target": "a", "type": "LA;" },
                    { "op": "new", "target": "b", "type": "LBox;" },
                    { "op": "invoke", "kind": "virtual", "method": "Box.id(LA;)LA;", "receiver": "b", "args": ["a"], "result": "r" }
                ]
            }] }
        ]
    }"#,
    )
    .unwrap();
    for sensitivity in ["ci", "1-call", "1-obj"] {
        let result = run(&program, sensitivity);
        assert_eq!(types_of(&result, main_var(&program, "r")), set(&["A"]));
        assert_eq!(
            types_of(&result, var(&program, "Box", "id(LA;)LA;", "v")),
            set(&["A"])
        );
        assert_fixpoint(&result);
    }
}

const RECURSION: &str = r#"{
    "entry": { "class": "Main", "method": "main()V" },
    "classes": [
        { "name": "A" },
        {
            "name": "Node",
            "methods": [
                {
                    "signature": "ping(LA;)LA;", "params": ["x"],
                    "locals": [{ "name": "r", "type": "LA;" }],
                    "body": [
                        { "op": "invoke", "kind": "virtual", "method": "Node.pong(LA;)LA;", "receiver": "this", "args": ["x"], "result": "r" },
                        { "op": "return", "value": "r" },
                        { "op": "return", "value": "x" }
                    ]
                },
                {
                    "signature": "pong(LA;)LA;", "params": ["y"],
                    "locals": [{ "name": "r", "type": "LA;" }],
                    "body": [
                        { "op": "invoke", "kind": "virtual", "method": "Node.ping(LA;)LA;", "receiver": "this", "args": ["y"], "result": "r" },
                        { "op": "return", "value": "r" }
                    ]
                }
            ]
        },
        { "name": "Main", "methods": [
            {
                "signature": "loop(LA;)LA;", "static": true, "params": ["p"],
                "locals": [{ "name": "q", "type": "LA;" }],
                "body": [
                    { "op": "invoke", "kind": "static", "method": "Main.loop(LA;)LA;", "args": ["p"], "result": "q" },
                    { "op": "return", "value": "q" },
                    { "op": "return", "value": "p" }
                ]
            },
            {
                "signature": "main()V", "static": true,
                "locals": [
                    { "name": "a", "type": "LA;" }, { "name": "n", "type": "LNode;" },
                    { "name": "s", "type": "LA;" }, { "name": "t", "type": "LA;" }
                ],
                "body": [
                    { "op": "new", "target": "a", "type": "LA;" },
                    { "op": "new", "target": "n", "type": "LNode;" },
                    { "op": "invoke", "kind": "static", "method": "Main.loop(LA;)LA;", "args": ["a"], "result": "s" },
                    { "op": "invoke", "kind": "virtual", "method": "Node.ping(LA;)LA;", "receiver": "n", "args": ["a"], "result": "t" }
                ]
            }
        ] }
    ]
}"#;

#[test]
fn recursive_methods_are_reached_once() {
    let program = load_program_str(RECURSION).unwrap();
    let looping = method(&program, "Main", "loop(LA;)LA;");
    let ping = method(&program, "Node", "ping(LA;)LA;");
    let pong = method(&program, "Node", "pong(LA;)LA;");

    for sensitivity in ["ci", "2-call", "2-obj", "1-type"] {
        let result = run(&program, sensitivity);
        assert_eq!(types_of(&result, main_var(&program, "s")), set(&["A"]));
        assert_eq!(types_of(&result, main_var(&program, "t")), set(&["A"]));
        for m in [looping, ping, pong] {
            assert!(result.ci_call_graph().contains(m));
        }
        assert_fixpoint(&result);
    }

    let ci = run(&program, "ci");
    assert_eq!(ci.stats().reachable_methods, 4);
    assert_eq!(ci.contexts_of(looping).len(), 1);
    assert_eq!(ci.contexts_of(ping).len(), 1);
    // one context per call site of loop
    let cs = run(&program, "1-call");
    assert_eq!(cs.contexts_of(looping).len(), 2);
}

#[test]
fn arrays_and_static_fields() {
    let program = load_program_str(
        r#"{
        "entry": { "class": "Main", "method": "main()V" },
        "classes": [
            { "name": "A" },
            { "name": "Main",
              "fields": [{ "name": "g", "type": "LA;", "static": true }],
              "methods": [
                {
                    "signature": "read()LA;", "static": true,
                    "locals": [{ "name": "s", "type": "LA;" }],
                    "body": [
                        { "op": "load", "target": "s", "field": "Main.g" },
                        { "op": "return", "value": "s" }
                    ]
                },
                {
                    "signature": "main()V", "static": true,
                    "locals": [
                        { "name": "arr", "type": "[LA;" }, { "name": "i", "type": "I" },
                        { "name": "a", "type": "LA;" }, { "name": "b", "type": "LA;" },
                        { "name": "s", "type": "LA;" }
                    ],
                    "body": [
                        { "op": "new", "target": "arr", "type": "[LA;" },
                        { "op": "array_load", "target": "b", "array": "arr", "index": "i" },
                        { "op": "new", "target": "a", "type": "LA;" },
                        { "op": "array_store", "array": "arr", "index": "i", "source": "a" },
                        { "op": "store", "field": "Main.g", "source": "b" },
                        { "op": "invoke", "kind": "static", "method": "Main.read()LA;", "result": "s" }
                    ]
                }
            ] }
        ]
    }"#,
    )
    .unwrap();
    let result = run(&program, "ci");
    let a = main_var(&program, "a");
    assert_eq!(types_of(&result, main_var(&program, "arr")), set(&["A[]"]));
    assert_eq!(result.var_points_to(main_var(&program, "b")), result.var_points_to(a));
    assert_eq!(result.var_points_to(main_var(&program, "s")), result.var_points_to(a));

    let g = program
        .get_class_by_name("Main")
        .unwrap()
        .get_field("g", &program)
        .unwrap()
        .uid();
    assert_eq!(result.field_points_to(g), result.var_points_to(a));
    assert_fixpoint(&result);
}

#[test]
fn fatal_errors() {
    let no_entry = load_program_str(r#"{ "classes": [{ "name": "A" }] }"#).unwrap();
    assert!(matches!(
        analyze(&no_entry, PtaOptions::default()),
        Err(AnalysisError::NoEntryMethod)
    ));

    let body = |stmts: &str| {
        format!(
            r#"{{
            "entry": {{ "class": "Main", "method": "main()V" }},
            "classes": [
                {{ "name": "A" }},
                {{ "name": "Main", "methods": [{{
                    "signature": "main()V", "static": true,
                    "locals": [{{ "name": "x", "type": "LA;" }}],
                    "body": [{stmts}]
                }}] }}
            ]
        }}"#
        )
    };

    let unresolved = load_program_str(&body(
        r#"{ "op": "new", "target": "x", "type": "LA;" },
           { "op": "invoke", "kind": "virtual", "method": "A.m()V", "receiver": "x" }"#,
    ))
    .unwrap();
    assert!(matches!(
        analyze(&unresolved, PtaOptions::default()),
        Err(AnalysisError::UnresolvedDispatch { .. })
    ));

    let dynamic = load_program_str(&body(
        r#"{ "op": "invoke", "kind": "dynamic", "method": "A.run()V" }"#,
    ))
    .unwrap();
    assert!(matches!(
        analyze(&dynamic, PtaOptions::default()),
        Err(AnalysisError::UnrecognizedCallKind { .. })
    ));

    let missing = load_program_str(&body(
        r#"{ "op": "invoke", "kind": "static", "method": "Main.missing()V" }"#,
    ))
    .unwrap();
    assert!(matches!(
        analyze(&missing, PtaOptions::default()),
        Err(AnalysisError::MethodNotFound(_))
    ));

    // a virtual call on a variable that never points to anything is harmless
    let never = load_program_str(&body(
        r#"{ "op": "invoke", "kind": "virtual", "method": "A.m()V", "receiver": "x" }"#,
    ))
    .unwrap();
    assert!(analyze(&never, PtaOptions::default()).is_ok());
}

#[test]
fn runs_are_deterministic() {
    let program = load_program_str(BOXES).unwrap();
    for sensitivity in ["ci", "1-call", "2-obj", "1-type"] {
        let first = run(&program, sensitivity);
        let second = run(&program, sensitivity);
        assert_eq!(first.stats(), second.stats());
        assert_eq!(first.pfg_to_dot(), second.pfg_to_dot());
        assert_eq!(first.call_graph_to_dot(), second.call_graph_to_dot());
    }
}
