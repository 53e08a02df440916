//! Text renderer: turns one `ModuleSchema` into a `.pyi` artifact.
//!
//! Output is organized in fixed sections (enums/flags, constants, functions,
//! classes, callback protocols, aliases) preceded by a deterministic import
//! header computed from the schema tree, so the artifact is self-contained.

use std::collections::BTreeSet;

use crate::docs::{DocTable, MemberKind};
use crate::meta::Direction;
use crate::records::{
    AliasRecord, CallableRecord, CallbackRecord, ClassRecord, ConstantRecord, EnumRecord,
    ModuleSchema, ReturnShape, SignalFlagSet, SignalRecord, TypeRef,
};

pub fn render_module(schema: &ModuleSchema, docs: &DocTable) -> String {
    let mut blocks: Vec<String> = Vec::new();

    blocks.push(header(schema));

    for alias in &schema.aliases {
        if alias.substitute {
            blocks.push(substitute_body(&alias.name));
        }
    }
    for e in &schema.enums {
        blocks.push(render_enum(e, docs));
    }
    if !schema.constants.is_empty() {
        blocks.push(
            schema
                .constants
                .iter()
                .map(|c| render_constant(c, docs))
                .collect::<Vec<_>>()
                .join("\n"),
        );
    }
    for f in &schema.functions {
        blocks.push(render_callable(f, None, docs, 0));
    }
    for c in &schema.classes {
        blocks.push(render_class(c, docs));
    }
    for cb in schema.callbacks.values() {
        blocks.push(render_callback(cb, docs));
    }
    let plain_aliases: Vec<String> = schema
        .aliases
        .iter()
        .filter(|a| !a.substitute)
        .map(render_alias)
        .collect();
    if !plain_aliases.is_empty() {
        blocks.push(plain_aliases.join("\n"));
    }

    let mut out = blocks.join("\n\n");
    out.push('\n');
    out
}

// ---------------------------------------------------------------------------
// Import header
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Usage {
    any: bool,
    callable: bool,
    optional: bool,
    int_enum: bool,
    int_flag: bool,
    foreign: BTreeSet<String>,
}

fn header(schema: &ModuleSchema) -> String {
    let usage = collect_usage(schema);
    let mut lines = vec![format!(
        "# {} {} stubs, generated by gi-stubgen. Do not edit.",
        schema.namespace, schema.version
    )];

    let mut enum_names = Vec::new();
    if usage.int_enum {
        enum_names.push("IntEnum");
    }
    if usage.int_flag {
        enum_names.push("IntFlag");
    }
    if !enum_names.is_empty() {
        lines.push(String::new());
        lines.push(format!("from enum import {}", enum_names.join(", ")));
    }

    let mut typing_names = Vec::new();
    if usage.any {
        typing_names.push("Any");
    }
    if usage.callable {
        typing_names.push("Callable");
    }
    if usage.optional {
        typing_names.push("Optional");
    }
    if !schema.callbacks.is_empty() {
        typing_names.push("Protocol");
    }
    if !typing_names.is_empty() {
        if enum_names.is_empty() {
            lines.push(String::new());
        }
        lines.push(format!("from typing import {}", typing_names.join(", ")));
    }

    if !usage.foreign.is_empty() {
        lines.push(String::new());
        for ns in &usage.foreign {
            lines.push(format!("from gi.repository import {ns}"));
        }
    }

    lines.join("\n")
}

fn collect_usage(schema: &ModuleSchema) -> Usage {
    let mut usage = Usage::default();
    visit_types(schema, &mut |ty| {
        if ty.nullable {
            usage.optional = true;
        }
        match (&ty.namespace, ty.name.as_str()) {
            (None, "Any") => usage.any = true,
            (None, "Callable") => usage.callable = true,
            (None, _) => {}
            (Some(ns), _) => {
                usage.foreign.insert(ns.clone());
            }
        }
    });
    for e in &schema.enums {
        match (&e.base.namespace, e.base.name.as_str()) {
            (None, "IntEnum") => usage.int_enum = true,
            (None, "IntFlag") => usage.int_flag = true,
            _ => {}
        }
    }
    for alias in &schema.aliases {
        match &alias.target {
            None => usage.any = true,
            Some(t) => {
                if let Some(ns) = &t.namespace {
                    usage.foreign.insert(ns.clone());
                }
            }
        }
        if alias.substitute {
            // Substitute bodies for the runtime enum/flag bases.
            match alias.name.as_str() {
                "GEnum" => usage.int_enum = true,
                "GFlags" => usage.int_flag = true,
                _ => {}
            }
        }
    }
    usage
}

fn visit_types(schema: &ModuleSchema, f: &mut impl FnMut(&TypeRef)) {
    fn callable(c: &CallableRecord, f: &mut impl FnMut(&TypeRef)) {
        for arg in &c.arguments {
            f(&arg.ty);
        }
        match &c.ret {
            ReturnShape::None => {}
            ReturnShape::Single(t) => f(t),
            ReturnShape::Tuple(parts) => {
                for t in parts {
                    f(t);
                }
            }
        }
    }

    for e in &schema.enums {
        f(&e.base);
    }
    for c in &schema.constants {
        f(&c.ty);
    }
    for func in &schema.functions {
        callable(func, f);
    }
    for class in &schema.classes {
        f(&class.base);
        for field in &class.fields {
            f(&field.ty);
        }
        for prop in &class.properties {
            f(&prop.ty);
        }
        for m in &class.methods {
            callable(m, f);
        }
        for s in &class.signals {
            callable(&s.handler, f);
        }
        if let Some(init) = &class.init {
            callable(init, f);
        }
    }
    for cb in schema.callbacks.values() {
        callable(&cb.signature, f);
    }
}

// ---------------------------------------------------------------------------
// Type and signature formatting
// ---------------------------------------------------------------------------

fn py_type(ty: &TypeRef) -> String {
    let base = ty.qualified();
    if ty.nullable {
        format!("Optional[{base}]")
    } else {
        base
    }
}

fn return_annotation(shape: &ReturnShape) -> String {
    match shape {
        ReturnShape::None => "None".to_string(),
        ReturnShape::Single(t) => py_type(t),
        ReturnShape::Tuple(parts) => {
            let inner: Vec<String> = parts.iter().map(py_type).collect();
            format!("tuple[{}]", inner.join(", "))
        }
    }
}

/// Parameter list for a callable: OUT-direction arguments are part of the
/// return shape, not the call signature; INOUT appears in both.
fn parameter_list(c: &CallableRecord, leading: &[&str], keyword_only: bool) -> String {
    let mut params: Vec<String> = leading.iter().map(|s| s.to_string()).collect();
    let mut visible = c
        .arguments
        .iter()
        .filter(|a| a.direction != Direction::Out)
        .peekable();
    if keyword_only && visible.peek().is_some() {
        params.push("*".to_string());
    }
    for arg in visible {
        if arg.name.starts_with('*') {
            params.push(format!("{}: {}", arg.name, py_type(&arg.ty)));
            continue;
        }
        let mut p = format!("{}: {}", arg.name, py_type(&arg.ty));
        if let Some(default) = &arg.default_repr {
            p.push_str(&format!(" = {default}"));
        }
        params.push(p);
    }
    params.join(", ")
}

// ---------------------------------------------------------------------------
// Section renderers
// ---------------------------------------------------------------------------

fn doc_lines(text: Option<&str>, pad: &str) -> Vec<String> {
    match text {
        Some(text) if !text.is_empty() => {
            if text.contains('\n') {
                let mut lines = vec![format!("{pad}\"\"\"")];
                for l in text.lines() {
                    lines.push(format!("{pad}{l}"));
                }
                lines.push(format!("{pad}\"\"\""));
                lines
            } else {
                vec![format!("{pad}\"\"\"{}\"\"\"", text.replace('"', "'"))]
            }
        }
        _ => Vec::new(),
    }
}

fn deprecation_comment(is_deprecated: bool, message: Option<&str>, pad: &str) -> Option<String> {
    if !is_deprecated {
        return None;
    }
    Some(match message {
        Some(msg) => format!("{pad}# deprecated: {msg}"),
        None => format!("{pad}# deprecated"),
    })
}

fn render_enum(e: &EnumRecord, docs: &DocTable) -> String {
    let mut lines = Vec::new();
    if let Some(c) = deprecation_comment(e.deprecated.is_deprecated, e.deprecated.message.as_deref(), "")
    {
        lines.push(c);
    }
    lines.push(format!("class {}({}):", e.name, e.base.qualified()));
    lines.extend(doc_lines(docs.lookup(None, MemberKind::Enum, &e.name), "    "));
    if e.members.is_empty() {
        lines.push("    ...".to_string());
    }
    for m in &e.members {
        let mut line = format!("    {} = {}", m.name, m.value);
        if m.is_deprecated {
            line.push_str("  # deprecated");
        }
        lines.push(line);
        if let Some(text) = docs.lookup(Some(&e.name), MemberKind::EnumMember, &m.name) {
            lines.extend(doc_lines(Some(text), "    "));
        }
    }
    lines.join("\n")
}

fn render_constant(c: &ConstantRecord, docs: &DocTable) -> String {
    let mut lines = Vec::new();
    if let Some(text) = docs.lookup(None, MemberKind::Constant, &c.name) {
        for l in text.lines() {
            lines.push(format!("# {l}"));
        }
    }
    if let Some(dep) = deprecation_comment(c.is_deprecated, None, "") {
        lines.push(dep);
    }
    lines.push(format!("{}: {} = {}", c.name, py_type(&c.ty), c.literal));
    lines.join("\n")
}

fn render_callable(
    f: &CallableRecord,
    class: Option<&str>,
    docs: &DocTable,
    depth: usize,
) -> String {
    let pad = "    ".repeat(depth);
    let mut lines = Vec::new();

    for note in &f.notes {
        lines.push(format!("{pad}# {note}"));
    }
    if f.can_throw {
        lines.push(format!("{pad}# raises GLib.Error"));
    }
    if let Some(dep) =
        deprecation_comment(f.deprecated.is_deprecated, f.deprecated.message.as_deref(), &pad)
    {
        lines.push(dep);
    }

    let in_class = class.is_some();
    let leading: &[&str] = if in_class && f.name == "__init__" {
        &["self"]
    } else if in_class && f.is_constructor {
        lines.push(format!("{pad}@classmethod"));
        &["cls"]
    } else if in_class && f.is_method {
        &["self"]
    } else if in_class {
        lines.push(format!("{pad}@staticmethod"));
        &[]
    } else {
        &[]
    };

    let keyword_only = f.name == "__init__";
    let params = parameter_list(f, leading, keyword_only);
    let ret = return_annotation(&f.ret);

    let kind = if in_class {
        MemberKind::Method
    } else {
        MemberKind::Function
    };
    let doc = docs.lookup(class, kind, &f.name);
    let body_pad = format!("{pad}    ");
    let doc_body = doc_lines(doc, &body_pad);
    if doc_body.is_empty() {
        lines.push(format!("{pad}def {}({params}) -> {ret}: ...", f.name));
    } else {
        lines.push(format!("{pad}def {}({params}) -> {ret}:", f.name));
        lines.extend(doc_body);
    }
    lines.join("\n")
}

fn signal_flag_names(flags: &SignalFlagSet) -> Vec<&'static str> {
    let mut names = Vec::new();
    if flags.run_first {
        names.push("run-first");
    }
    if flags.run_last {
        names.push("run-last");
    }
    if flags.run_cleanup {
        names.push("run-cleanup");
    }
    if flags.no_recurse {
        names.push("no-recurse");
    }
    if flags.detailed {
        names.push("detailed");
    }
    if flags.action {
        names.push("action");
    }
    if flags.no_hooks {
        names.push("no-hooks");
    }
    if flags.is_deprecated {
        names.push("deprecated");
    }
    names
}

/// Stub syntax cannot express signals; they are documented as a comment
/// block so readers still see the name, flags and handler signature.
fn render_signal_block(signals: &[SignalRecord], class: &str, docs: &DocTable) -> Vec<String> {
    let mut lines = vec!["    # Signals:".to_string()];
    for s in signals {
        let params = parameter_list(&s.handler, &[], false);
        let ret = return_annotation(&s.handler.ret);
        let flags = signal_flag_names(&s.flags);
        let flag_suffix = if flags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", flags.join(", "))
        };
        lines.push(format!("    #   {}{}: ({params}) -> {ret}", s.name, flag_suffix));
        if let Some(text) = docs.lookup(Some(class), MemberKind::Signal, &s.name) {
            for l in text.lines() {
                lines.push(format!("    #       {l}"));
            }
        }
    }
    lines
}

fn render_class(c: &ClassRecord, docs: &DocTable) -> String {
    let mut lines = Vec::new();
    if let Some(dep) =
        deprecation_comment(c.deprecated.is_deprecated, c.deprecated.message.as_deref(), "")
    {
        lines.push(dep);
    }
    lines.push(format!("class {}({}):", c.name, c.base.qualified()));
    let doc = doc_lines(docs.lookup(None, MemberKind::Class, &c.name), "    ");
    let has_doc = !doc.is_empty();
    lines.extend(doc);

    let mut body = Vec::new();

    if !c.properties.is_empty() {
        body.push("    class Props:".to_string());
        for p in &c.properties {
            let mut line = format!("        {}: {}", p.name, py_type(&p.ty));
            let mut marks = Vec::new();
            if !p.writable {
                marks.push("read-only");
            } else if p.construct_only {
                marks.push("construct-only");
            }
            if p.is_deprecated {
                marks.push("deprecated");
            }
            if !marks.is_empty() {
                line.push_str(&format!("  # {}", marks.join(", ")));
            }
            if let Some(text) = docs.lookup(Some(&c.name), MemberKind::Property, &p.name) {
                for l in text.lines() {
                    body.push(format!("        # {l}"));
                }
            }
            body.push(line);
        }
        body.push("    props: Props = ...".to_string());
    }

    for field in &c.fields {
        let mut marks = Vec::new();
        if field.read_only {
            marks.push("read-only".to_string());
        }
        if let Some(note) = &field.note {
            marks.push(note.clone());
        }
        let mut line = format!("    {}: {} = ...", field.name, py_type(&field.ty));
        if !marks.is_empty() {
            line.push_str(&format!("  # {}", marks.join("; ")));
        }
        if let Some(text) = docs.lookup(Some(&c.name), MemberKind::Field, &field.name) {
            for l in text.lines() {
                body.push(format!("    # {l}"));
            }
        }
        body.push(line);
    }

    if !c.signals.is_empty() {
        body.extend(render_signal_block(&c.signals, &c.name, docs));
    }

    if let Some(init) = &c.init {
        body.push(render_callable(init, Some(&c.name), docs, 1));
    }
    for m in &c.methods {
        body.push(render_callable(m, Some(&c.name), docs, 1));
    }

    if body.is_empty() && !has_doc {
        lines.push("    ...".to_string());
    } else {
        lines.extend(body);
    }
    lines.join("\n")
}

fn render_callback(cb: &CallbackRecord, docs: &DocTable) -> String {
    let mut lines = Vec::new();
    lines.push(format!("class {}(Protocol):", cb.name));
    lines.extend(doc_lines(
        docs.lookup(None, MemberKind::Callback, &cb.name),
        "    ",
    ));
    if !cb.origins.is_empty() {
        let origins: Vec<&str> = cb.origins.iter().map(String::as_str).collect();
        lines.push(format!("    # used from: {}", origins.join(", ")));
    }
    let params = parameter_list(&cb.signature, &["self"], false);
    let ret = return_annotation(&cb.signature.ret);
    lines.push(format!("    def __call__({params}) -> {ret}: ..."));
    lines.join("\n")
}

fn render_alias(alias: &AliasRecord) -> String {
    match &alias.target {
        Some(target) => {
            let rhs = match &target.namespace {
                Some(ns) => format!("{ns}.{}", target.name),
                None => target.name.clone(),
            };
            format!("{} = {}  # {}", alias.name, rhs, alias.reason)
        }
        None => format!("# {}\n{} = Any", alias.reason, alias.name),
    }
}

/// Hand-authored bodies for the runtime-level enum/flag base types: the
/// introspected targets lack the members the binding injects at runtime.
fn substitute_body(name: &str) -> String {
    match name {
        "GEnum" => "\
class GEnum(IntEnum):
    @property
    def value_name(self) -> str: ...
    @property
    def value_nick(self) -> str: ..."
            .to_string(),
        "GFlags" => "\
class GFlags(IntFlag):
    @property
    def first_value_name(self) -> str: ...
    @property
    def first_value_nick(self) -> str: ..."
            .to_string(),
        other => format!("class {other}: ..."),
    }
}
