use std::fs;
use std::path::PathBuf;

use specializer::{
    get_specializer, LanguageRegistry, SemanticType, Specialize, SpecializeError, Specializer,
};

fn bundled_templates() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("templates")
}

fn sample_externs() -> Vec<specializer::Extern> {
    vec![
        specializer::Extern::new("add", SemanticType::Int)
            .arg("a", SemanticType::Int)
            .arg("b", SemanticType::Int)
            .body("return a+b;"),
        specializer::Extern::new("ex_for", SemanticType::Float)
            .arg("start", SemanticType::Int)
            .arg("end", SemanticType::Int)
            .body("return 0.0;"),
        specializer::Extern::new("greet", SemanticType::None)
            .arg("who", SemanticType::Str)
            .body("(void)who;"),
    ]
}

#[test]
fn test_bundled_templates_render_for_every_builtin_language() {
    for name in ["c", "chapel"] {
        let spec = Specializer::for_language(name, bundled_templates()).unwrap();
        let source = spec.specialize(&sample_externs(), true).unwrap();
        assert!(source.contains("add"), "{} output: {}", name, source);
    }
}

#[test]
fn test_bundled_c_output() {
    let spec = Specializer::for_language("c", bundled_templates()).unwrap();
    let source = spec.specialize(&sample_externs()[..1], false).unwrap();
    assert_eq!(source, "int add(int a, int b)\n{\nreturn a+b;\n}\n\n");
}

#[test]
fn test_bundled_chapel_output() {
    let spec = Specializer::for_language("chapel", bundled_templates()).unwrap();
    let source = spec.specialize(&sample_externs()[1..2], false).unwrap();
    assert_eq!(
        source,
        "export proc ex_for(start: int, end: int): real(64)\n{\nreturn 0.0;\n}\n\n"
    );
}

#[test]
fn test_output_preserves_extern_order() {
    let spec = Specializer::for_language("c", bundled_templates()).unwrap();
    let source = spec.specialize(&sample_externs(), true).unwrap();

    let add = source.find("int add(").unwrap();
    let ex_for = source.find("double ex_for(").unwrap();
    let greet = source.find("void greet(char* who)").unwrap();
    assert!(add < ex_for && ex_for < greet);
}

#[test]
fn test_prefix_toggle_only_strips_prefix() {
    for name in ["c", "chapel"] {
        let spec = Specializer::for_language(name, bundled_templates()).unwrap();
        let language = get_specializer(name).unwrap();
        let prefix = spec.load(&language.prefix_filename).unwrap();

        let with_prefix = spec.specialize(&sample_externs(), true).unwrap();
        let without_prefix = spec.specialize(&sample_externs(), false).unwrap();
        assert_eq!(with_prefix.strip_prefix(&*prefix), Some(without_prefix.as_str()));
    }
}

#[test]
fn test_fresh_instances_are_byte_identical() {
    let first = Specializer::for_language("chapel", bundled_templates())
        .unwrap()
        .specialize(&sample_externs(), true)
        .unwrap();
    let second = Specializer::for_language("chapel", bundled_templates())
        .unwrap()
        .specialize(&sample_externs(), true)
        .unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_empty_extern_list_yields_prefix_only() {
    let spec = Specializer::for_language("c", bundled_templates()).unwrap();
    let prefix = spec.load("inline.prefix.c").unwrap();
    assert_eq!(spec.specialize(&[], true).unwrap(), &*prefix);
    assert_eq!(spec.specialize(&[], false).unwrap(), "");
}

#[test]
fn test_independent_instances_across_threads() {
    let expected = Specializer::for_language("c", bundled_templates())
        .unwrap()
        .specialize(&sample_externs(), true)
        .unwrap();

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                s.spawn(|| {
                    Specializer::for_language("c", bundled_templates())
                        .unwrap()
                        .specialize(&sample_externs(), true)
                        .unwrap()
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

#[test]
fn test_malformed_func_template_fails_fast() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("inline.prefix.c"), "").unwrap();
    fs::write(dir.path().join("inline.func.c"), "%(rtype)s %(name)s(%(args)s) {}\n").unwrap();

    let spec = Specializer::for_language("c", dir.path()).unwrap();
    let err = spec.specialize(&sample_externs(), true).unwrap_err();
    assert!(matches!(err, SpecializeError::TemplateSlot { .. }));
}

#[test]
fn test_custom_language_from_toml() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("inline.prefix.zig"), "const std = @import(\"std\");\n").unwrap();
    fs::write(
        dir.path().join("inline.func.zig"),
        "export fn %(ename)s(%(args)s) %(rtype)s { %(fbody)s }\n",
    )
    .unwrap();
    let langs = dir.path().join("langs.toml");
    fs::write(
        &langs,
        r#"
[[language]]
name = "zig"
prefix_filename = "inline.prefix.zig"
func_filename = "inline.func.zig"
join_style = "name-then-type"

[language.type_table]
none = "void"
int = "c_int"
"#,
    )
    .unwrap();

    let mut registry = LanguageRegistry::builtin();
    registry.load_toml(&langs).unwrap();
    let spec = Specializer::new(registry.get("ZIG").unwrap(), dir.path());
    let ext = specializer::Extern::new("inc", SemanticType::Int)
        .arg("x", SemanticType::Int)
        .body("return x + 1;");

    assert_eq!(
        spec.specialize(&[ext], false).unwrap(),
        "export fn inc(x: c_int) c_int { return x + 1; }\n"
    );
}
