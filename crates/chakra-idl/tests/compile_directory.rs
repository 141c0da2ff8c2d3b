//! Directory driver tests
//!
//! Run with:
//! ```
//! cargo test -p chakra-idl --test compile_directory
//! ```

use std::fs;
use std::path::Path;

use chakra_idl::{compile, compile_directory, CompileOptions, DriverOptions, IdlError};
use tempfile::TempDir;

const WORLD: &str = r#"
#include <Zmey/World.h>
interface Zmey::World {
    constructor(int capacity);
    readonly attribute int entityCount;
    Zmey::Entity& spawn(string name);
}
"#;

const ENTITY: &str = r#"
#include <Zmey/Entity.h>
delegate void Game::OnHit(int damage);
interface Zmey::Entity {
    attribute string name;
    attribute float health;
    void destroy();
}
"#;

fn write(dir: &Path, name: &str, text: &str) {
    fs::write(dir.join(name), text).unwrap();
}

fn source_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "world.idl", WORLD);
    write(dir.path(), "entity.idl", ENTITY);
    write(dir.path(), "notes.txt", "not an idl file");
    fs::create_dir(dir.path().join("nested")).unwrap();
    write(&dir.path().join("nested"), "hidden.idl", "interface Hidden {}");
    dir
}

#[test]
fn test_per_file_mode() {
    let src = source_dir();
    let dest = TempDir::new().unwrap();
    let out = dest.path().join("glue");

    let report = compile_directory(src.path(), &out, &DriverOptions::default()).unwrap();

    assert_eq!(report.compiled.len(), 2);
    assert!(report.skipped.is_empty());
    assert_eq!(report.written, vec![out.join("entity.cpp"), out.join("world.cpp")]);
    assert!(!out.join("hidden.cpp").exists());
    assert!(!out.join("notes.cpp").exists());

    let world = fs::read_to_string(out.join("world.cpp")).unwrap();
    assert_eq!(world, compile(WORLD, &CompileOptions::default()).unwrap().code);
    assert!(world.contains("#include <Zmey/World.h>\n"));
}

#[test]
fn test_per_file_mode_is_idempotent() {
    let src = source_dir();
    let dest = TempDir::new().unwrap();

    compile_directory(src.path(), dest.path(), &DriverOptions::default()).unwrap();
    let first = fs::read(dest.path().join("entity.cpp")).unwrap();
    compile_directory(src.path(), dest.path(), &DriverOptions::default()).unwrap();
    let second = fs::read(dest.path().join("entity.cpp")).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_aggregate_mode_concatenates_in_name_order() {
    let src = source_dir();
    let dest = TempDir::new().unwrap();
    let options = DriverOptions::default().aggregate("Glue.cpp");

    // Stale content must be truncated away
    write(dest.path(), "Glue.cpp", "stale");
    let report = compile_directory(src.path(), dest.path(), &options).unwrap();

    assert_eq!(report.written, vec![dest.path().join("Glue.cpp")]);
    let glue = fs::read_to_string(dest.path().join("Glue.cpp")).unwrap();
    let expected = [ENTITY, WORLD]
        .iter()
        .map(|text| compile(text, &CompileOptions::default()).unwrap().code)
        .collect::<String>();
    assert_eq!(glue, expected);
    assert!(!dest.path().join("world.cpp").exists());
}

#[test]
fn test_empty_file_is_skipped() {
    let src = source_dir();
    write(src.path(), "empty.idl", "// placeholder\n#include <Zmey/Unused.h>\n");
    let dest = TempDir::new().unwrap();

    let report = compile_directory(src.path(), dest.path(), &DriverOptions::default()).unwrap();

    assert_eq!(report.skipped, vec![src.path().join("empty.idl")]);
    assert_eq!(report.compiled.len(), 2);
    assert!(!dest.path().join("empty.cpp").exists());
}

#[test]
fn test_unsupported_type_aborts_before_output() {
    let src = TempDir::new().unwrap();
    write(src.path(), "bad.idl", "interface Bad { readonly attribute long ticks; }");
    let dest = TempDir::new().unwrap();

    let err = compile_directory(src.path(), dest.path(), &DriverOptions::default()).unwrap_err();

    assert!(matches!(err.root(), IdlError::UnsupportedType { .. }));
    assert!(err.to_string().contains("bad.idl"));
    assert!(!dest.path().join("bad.cpp").exists());
}

#[test]
fn test_malformed_file_names_fragment() {
    let src = TempDir::new().unwrap();
    write(src.path(), "broken.idl", "interface Broken {\n    int oops(int;\n}");
    let dest = TempDir::new().unwrap();

    let err = compile_directory(src.path(), dest.path(), &DriverOptions::default()).unwrap_err();

    match err.root() {
        IdlError::GrammarMismatch { fragment } => assert_eq!(fragment, "int oops(int;"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_aggregate_rejects_duplicate_interfaces_across_files() {
    let src = TempDir::new().unwrap();
    write(src.path(), "a.idl", "interface Foo::Bar { int x(); }");
    write(src.path(), "b.idl", "interface FooBar { int y(); }");
    let dest = TempDir::new().unwrap();

    let per_file = compile_directory(src.path(), dest.path(), &DriverOptions::default());
    assert!(per_file.is_ok());

    let options = DriverOptions::default().aggregate("All.cpp");
    let err = compile_directory(src.path(), dest.path(), &options).unwrap_err();
    assert!(matches!(err.root(), IdlError::DuplicateInterface { name } if name == "FooBar"));
    assert!(err.to_string().contains("b.idl"));
}

#[test]
fn test_aggregate_rejects_duplicate_delegates_across_files() {
    let src = TempDir::new().unwrap();
    write(src.path(), "a.idl", "delegate void Game::OnHit(int d);\ninterface A { int x(); }");
    write(src.path(), "b.idl", "delegate void Game::OnHit(int d);\ninterface B { int y(); }");
    let dest = TempDir::new().unwrap();

    assert!(compile_directory(src.path(), dest.path(), &DriverOptions::default()).is_ok());

    let options = DriverOptions::default().aggregate("All.cpp");
    let err = compile_directory(src.path(), dest.path(), &options).unwrap_err();
    assert!(matches!(err.root(), IdlError::DuplicateDelegate { name } if name == "Game::OnHit"));
    assert!(err.to_string().contains("b.idl"));
}

#[test]
fn test_aggregate_references_later_interface() {
    let src = TempDir::new().unwrap();
    write(src.path(), "a.idl", "interface Zmey::World { Zmey::Entity& spawn(); }");
    write(src.path(), "b.idl", "interface Zmey::Entity { void destroy(); }");
    let dest = TempDir::new().unwrap();

    let options = DriverOptions::default().aggregate("All.cpp");
    compile_directory(src.path(), dest.path(), &options).unwrap();

    let glue = fs::read_to_string(dest.path().join("All.cpp")).unwrap();
    let forward = glue.find("extern JsValueRef JsZmeyEntityPrototype;").unwrap();
    let used = glue.find("JsSetPrototype(output, JsZmeyEntityPrototype);").unwrap();
    let defined = glue.find("\nJsValueRef JsZmeyEntityPrototype;").unwrap();
    assert!(forward < used && used < defined);
}

#[cfg(unix)]
#[test]
fn test_symlinked_source_is_compiled() {
    let src = TempDir::new().unwrap();
    let elsewhere = TempDir::new().unwrap();
    write(elsewhere.path(), "real.idl", "interface Linked { int x(); }");
    std::os::unix::fs::symlink(elsewhere.path().join("real.idl"), src.path().join("linked.idl")).unwrap();
    std::os::unix::fs::symlink(src.path().join("missing.idl"), src.path().join("dangling.idl")).unwrap();
    let dest = TempDir::new().unwrap();

    let report = compile_directory(src.path(), dest.path(), &DriverOptions::default()).unwrap();

    assert_eq!(report.written, vec![dest.path().join("linked.cpp")]);
}

#[test]
fn test_custom_extensions() {
    let src = TempDir::new().unwrap();
    write(src.path(), "shapes.webidl", "interface Shape { double area(); }");
    write(src.path(), "ignored.idl", "interface Ignored {}");
    let dest = TempDir::new().unwrap();

    let options = DriverOptions::default()
        .with_source_extension("webidl")
        .with_output_extension("inl");
    let report = compile_directory(src.path(), dest.path(), &options).unwrap();

    assert_eq!(report.written, vec![dest.path().join("shapes.inl")]);
}
