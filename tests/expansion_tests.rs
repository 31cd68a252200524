//! Engine behaviour over realistic shader sets
//!
//! Runs through the public `shady-core` API only: sources in, expansions out.

mod common;

use chrono::{DateTime, TimeZone, Utc};
use common::body;
use shady_core::{CacheStamp, Diagnostic, ExpandOptions, Shader, ShaderIndex, ShaderSource, classify_all};

fn modified() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

fn build(sources: &[ShaderSource]) -> (ShaderIndex, Vec<Diagnostic>) {
    classify_all(sources.iter().map(Shader::from_source).collect(), 4).unwrap()
}

fn fresh(name: &str, text: &str) -> ShaderSource {
    ShaderSource::new(name, text, modified())
}

fn cached(name: &str, text: &str) -> ShaderSource {
    fresh(name, text).with_cached_header(CacheStamp::new(modified()).header())
}

fn library() -> Vec<ShaderSource> {
    vec![
        fresh(
            "noise.fsh",
            "#define NOISE_SCALE 3.0\n\
             float hash(vec2 p)\n\
             {\n    return fract(sin(dot(p, vec2(12.9898, 78.233))) * 43758.5453);\n}\n\
             #pragma shady: macro_begin GRAIN\n\
             gl_FragColor.rgb *= 0.95;\n\
             #pragma shady: macro_end\n",
        ),
        fresh(
            "blur.fsh",
            "#pragma shady: import(noise.hash)\n\
             varying vec2 v_vTexcoord;\n\
             uniform sampler2D gm_BaseTexture;\n\
             vec4 blur(vec2 uv)\n\
             {\n    return texture2D(gm_BaseTexture, uv) * hash(uv);\n}\n\
             void main()\n\
             {\n    gl_FragColor = blur(v_vTexcoord);\n}\n",
        ),
        fresh(
            "post.fsh",
            "#pragma shady: import(blur)\n\
             #pragma shady: import(noise.hash)\n\
             varying vec2 v_vTexcoord;\n\
             void main()\n\
             {\n    gl_FragColor = blur(v_vTexcoord);\n\
             \x20   #pragma shady: inline(noise.GRAIN)\n\
             \x20   #pragma shady: inline(noise.GRAIN)\n}\n",
        ),
        fresh("post_hq.fsh", "#pragma shady: variant(post, HIGH_QUALITY, USE_GRAIN)\n"),
    ]
}

#[test]
fn test_no_directive_survives_expansion() {
    let (index, diagnostics) = build(&library());
    assert!(diagnostics.is_empty());

    for expansion in index.expand_all(&ExpandOptions::default()) {
        assert!(
            !expansion.text.contains("#pragma shady:"),
            "{} still has a directive:\n{}",
            expansion.name,
            expansion.text
        );
        assert!(expansion.diagnostics.is_empty(), "{:?}", expansion.diagnostics);
    }
}

#[test]
fn test_non_macro_regions_appear_once() {
    let (index, _) = build(&library());
    let post = index.expand("post.fsh", &ExpandOptions::default()).unwrap();

    // `hash` arrives through blur, the direct import of it is skipped
    assert_eq!(post.text.matches("// begin import noise.fsh.hash").count(), 1);
    assert_eq!(post.text.matches("float hash(vec2 p)").count(), 1);
    assert_eq!(post.text.matches("// begin import blur.fsh.__shady_export").count(), 1);
    assert!(!post.text.contains("uniform sampler2D gm_BaseTexture;"));
}

#[test]
fn test_each_inline_is_a_copy() {
    let (index, _) = build(&library());
    let post = index.expand("post.fsh", &ExpandOptions::default()).unwrap();
    assert_eq!(post.text.matches("gl_FragColor.rgb *= 0.95;").count(), 2);
}

#[test]
fn test_variant_wraps_base_expansion() {
    let (index, _) = build(&library());
    let variant = index.expand("post_hq.fsh", &ExpandOptions::default()).unwrap();
    let base = index.expand("post.fsh", &ExpandOptions::default()).unwrap();

    let lines = body(&variant.text);
    assert_eq!(&lines[..4], ["// variant of post.fsh", "#define HIGH_QUALITY", "#define USE_GRAIN", ""]);
    assert_eq!(&lines[4..], body(&base.text).as_slice());
}

#[test]
fn test_import_symbol_scenario() {
    let (index, _) = build(&[
        fresh("a.fsh", "#pragma shady: import(b.c)\nvoid main() {}\n"),
        fresh("b.fsh", "float c = 1.0;\n"),
    ]);
    let a = index.expand("a.fsh", &ExpandOptions::default()).unwrap();
    assert!(a.modified);
    assert_eq!(
        body(&a.text),
        ["// begin import b.fsh.c", "#line 1", "float c = 1.0;", "// end import b.fsh.c", "#line 2", "void main() {}"]
    );
}

#[test]
fn test_missing_region_is_one_error() {
    let (index, _) = build(&[
        fresh("a.fsh", "float before = 0.0;\n#pragma shady: import(b.missing)\nfloat after = 1.0;\n"),
        fresh("b.fsh", "float c = 1.0;\n"),
    ]);
    let a = index.expand("a.fsh", &ExpandOptions::default()).unwrap();
    assert_eq!(a.diagnostics.len(), 1);
    assert_eq!(
        a.diagnostics[0].to_string(),
        "Import Error in a.fsh, line 2: Cannot import 'missing' from 'b.fsh', identifier doesn't exist!"
    );
    assert_eq!(body(&a.text), ["#line 1", "float before = 0.0;", "#line 3", "float after = 1.0;"]);
}

#[test]
fn test_skip_compilation_ignores_everything_else() {
    let (index, _) = build(&[fresh(
        "s.fsh",
        "#pragma shady: variant(base, X)\nfloat x = 1.0;\n#pragma shady: skip_compilation\nvoid main() { discard; }\n",
    )]);
    let s = index.expand("s.fsh", &ExpandOptions::default()).unwrap();
    assert_eq!(body(&s.text), ["// shader skipped by skip_compilation", "void main() {}"]);
}

#[test]
fn test_cached_inputs_expand_identically() {
    let sources = [
        cached("a.fsh", "#pragma shady: import(b)\nvoid main() {}\n"),
        cached("b.fsh", "float b = 1.0;\n"),
    ];
    let (first, _) = build(&sources);
    let (second, _) = build(&sources);

    let a1 = first.expand("a.fsh", &ExpandOptions::default()).unwrap();
    let a2 = second.expand("a.fsh", &ExpandOptions::default()).unwrap();
    assert_eq!(a1.text, a2.text);
    assert!(!a1.dirty);
    assert!(a1.text.starts_with(&CacheStamp::new(modified()).header()));
}

#[test]
fn test_dirty_propagates_from_imports() {
    let (index, _) = build(&[
        cached("a.fsh", "#pragma shady: import(b)\nvoid main() {}\n"),
        fresh("b.fsh", "float b = 2.0;\n"),
        cached("c.fsh", "#pragma shady: inline(b)\nvoid main() {}\n"),
        cached("v.fsh", "#pragma shady: variant(b)\n"),
    ]);
    let options = ExpandOptions::default();
    assert!(index.expand("a.fsh", &options).unwrap().dirty);
    assert!(index.expand("c.fsh", &options).unwrap().dirty);
    assert!(index.expand("v.fsh", &options).unwrap().dirty);
    assert!(index.expand("b.fsh", &options).unwrap().dirty);
}

#[test]
fn test_dirty_propagates_through_import_chain() {
    let (index, _) = build(&[
        cached("a.fsh", "#pragma shady: import(b)\nvoid main() {}\n"),
        cached("b.fsh", "#pragma shady: import(c)\nfloat b = 2.0;\n"),
        fresh("c.fsh", "float c = 3.0;\n"),
    ]);
    let options = ExpandOptions::default();
    let a = index.expand("a.fsh", &options).unwrap();
    assert!(a.dirty);
    assert!(a.text.contains("float c = 3.0;"));
    assert!(index.expand("b.fsh", &options).unwrap().dirty);
}

#[test]
fn test_foreign_extension_import() {
    let (index, _) = build(&[
        fresh("a.fsh", "#pragma shady: import(shared.vsh.scale)\nvoid main() {}\n"),
        fresh("shared.vsh", "float scale = 2.0;\nvoid main() {}\n"),
    ]);
    let a = index.expand("a.fsh", &ExpandOptions::default()).unwrap();
    assert!(a.text.contains("// begin import shared.vsh.scale\n#line 1\nfloat scale = 2.0;\n"));
}
