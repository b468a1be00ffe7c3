//! Member-level merge of Java sources
//!
//! The old file is not parsed into a full syntax tree. Comments and literals
//! are masked out first, which leaves enough structure (braces, semicolons,
//! the type header) to split the body into members and read their names.

use std::collections::HashSet;

use regex::Regex;

use crate::config::defaults;
use crate::dom::{CompilationUnit, JavaType, Method};
use crate::error::{CodegenError, Result};

/// Member identity: name plus parameter count for methods and constructors
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MemberKey {
    name: String,
    params: Option<usize>,
}

#[derive(Debug)]
struct OldMember {
    key: Option<MemberKey>,
    tagged: bool,
    /// Member text with leading comments, trimmed
    text: String,
}

#[derive(Debug)]
struct OldUnit {
    kind: String,
    superclass: Option<String>,
    interfaces: Vec<String>,
    imports: Vec<String>,
    annotations: Vec<String>,
    members: Vec<OldMember>,
}

/// Merge `fresh` into the text of an existing Java file.
///
/// Members tagged with the retention tag are regenerated; untagged members
/// are kept verbatim and win over a fresh member with the same name and
/// arity. Imports, superinterfaces and type annotations are unioned. A
/// different declaration kind or superclass fails the merge.
pub fn merge_java(existing: &str, fresh: &CompilationUnit, file: &str) -> Result<String> {
    let fail = |reason: String| CodegenError::MergeError {
        file: file.to_string(),
        reason,
    };

    let old = parse(existing)?.ok_or_else(|| fail("no type declaration found".to_string()))?;

    if old.kind != fresh.kind.keyword() {
        return Err(fail(format!(
            "declared as {}, regenerated as {}",
            old.kind,
            fresh.kind.keyword()
        )));
    }
    let fresh_superclass = fresh.superclass.as_ref().map(JavaType::short_name);
    if old.superclass.as_deref().map(base_name) != fresh_superclass.as_deref().map(base_name) {
        return Err(fail(format!(
            "superclass is {}, regenerated as {}",
            old.superclass.as_deref().unwrap_or("<none>"),
            fresh_superclass.as_deref().unwrap_or("<none>")
        )));
    }

    let mut merged = fresh.clone();
    for import in &old.imports {
        merged.imports.insert(import.clone());
    }
    for interface in &old.interfaces {
        let known = merged
            .super_interfaces
            .iter()
            .any(|t| base_name(&t.short_name()) == base_name(interface));
        if !known {
            merged.super_interfaces.push(JavaType::new(interface.clone()));
        }
    }
    for annotation in &old.annotations {
        merged.add_annotation(annotation.clone());
    }

    let kept: Vec<&OldMember> = old.members.iter().filter(|m| !m.tagged).collect();
    let kept_keys: HashSet<&MemberKey> = kept.iter().filter_map(|m| m.key.as_ref()).collect();
    let owner = fresh.ty.short_name();
    merged.fields.retain(|f| {
        !kept_keys.contains(&MemberKey {
            name: f.name.clone(),
            params: None,
        })
    });
    merged
        .methods
        .retain(|m| !kept_keys.contains(&method_key(m, &owner)));
    merged.retained_members = kept.iter().map(|m| m.text.clone()).collect();

    Ok(merged.render())
}

fn method_key(method: &Method, owner: &str) -> MemberKey {
    let name = if method.is_constructor() {
        owner.to_string()
    } else {
        method.name.clone()
    };
    MemberKey {
        name,
        params: Some(method.parameters.len()),
    }
}

/// `List<Integer>` -> `List`
fn base_name(name: &str) -> &str {
    let name = name.split('<').next().unwrap_or(name).trim();
    name.rsplit('.').next().unwrap_or(name)
}

/// Replace comments and literal contents with spaces, keeping byte offsets
fn mask(text: &str) -> String {
    #[derive(Clone, Copy, PartialEq)]
    enum State {
        Code,
        LineComment,
        BlockComment,
        Str,
        TextBlock,
        Char,
    }

    let bytes = text.as_bytes();
    let mut out = bytes.to_vec();
    let mut state = State::Code;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        let next = bytes.get(i + 1).copied();
        match state {
            State::Code => match (b, next) {
                (b'/', Some(b'/')) => {
                    state = State::LineComment;
                    out[i] = b' ';
                    out[i + 1] = b' ';
                    i += 1;
                }
                (b'/', Some(b'*')) => {
                    state = State::BlockComment;
                    out[i] = b' ';
                    out[i + 1] = b' ';
                    i += 1;
                }
                (b'"', _) if bytes[i..].starts_with(b"\"\"\"") => {
                    state = State::TextBlock;
                    i += 2;
                }
                (b'"', _) => state = State::Str,
                (b'\'', _) => state = State::Char,
                _ => {}
            },
            State::LineComment => {
                if b == b'\n' {
                    state = State::Code;
                } else {
                    out[i] = b' ';
                }
            }
            State::BlockComment => {
                if b == b'*' && next == Some(b'/') {
                    out[i] = b' ';
                    out[i + 1] = b' ';
                    i += 1;
                    state = State::Code;
                } else if b != b'\n' {
                    out[i] = b' ';
                }
            }
            State::Str | State::Char => {
                let close = if state == State::Str { b'"' } else { b'\'' };
                if b == b'\\' {
                    out[i] = b' ';
                    if next.is_some() {
                        out[i + 1] = b' ';
                    }
                    i += 1;
                } else if b == close {
                    state = State::Code;
                } else if b != b'\n' {
                    out[i] = b' ';
                }
            }
            State::TextBlock => {
                if bytes[i..].starts_with(b"\"\"\"") {
                    state = State::Code;
                    i += 2;
                } else if b == b'\\' {
                    out[i] = b' ';
                    if next.is_some() {
                        out[i + 1] = b' ';
                    }
                    i += 1;
                } else if b != b'\n' {
                    out[i] = b' ';
                }
            }
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Split at top-level commas, ignoring commas inside `<>` and `()`
fn split_top_level(list: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut current = String::new();
    for c in list.chars() {
        match c {
            '<' | '(' => depth += 1,
            '>' | ')' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(current.trim().to_string());
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }
    parts
}

/// Skip a balanced `<...>` at the start of `text`
fn skip_type_parameters(text: &str) -> &str {
    let trimmed = text.trim_start();
    if !trimmed.starts_with('<') {
        return trimmed;
    }
    let mut depth = 0;
    for (i, c) in trimmed.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => {
                depth -= 1;
                if depth == 0 {
                    return &trimmed[i + 1..];
                }
            }
            _ => {}
        }
    }
    ""
}

fn parse(text: &str) -> Result<Option<OldUnit>> {
    let masked = mask(text);
    let declaration =
        Regex::new(r"\b(class|interface|enum|record|@interface)\s+([A-Za-z_$][\w$]*)")?;
    let Some(decl) = declaration.captures(&masked) else {
        return Ok(None);
    };
    let (Some(whole), Some(kind), Some(name)) = (decl.get(0), decl.get(1), decl.get(2)) else {
        return Ok(None);
    };
    let Some(open) = masked[name.end()..].find('{').map(|i| name.end() + i) else {
        return Ok(None);
    };

    let clause = skip_type_parameters(&masked[name.end()..open]);
    let clause_pattern =
        Regex::new(r"^\s*(?:extends\s+(?P<ext>.*?))?\s*(?:implements\s+(?P<imp>.*?))?\s*$")?;
    let (extends, implements) = match clause_pattern.captures(clause.trim()) {
        Some(c) => (
            c.name("ext").map(|m| split_top_level(m.as_str())).unwrap_or_default(),
            c.name("imp").map(|m| split_top_level(m.as_str())).unwrap_or_default(),
        ),
        None => (Vec::new(), Vec::new()),
    };
    let (superclass, interfaces) = if kind.as_str() == "interface" {
        (None, extends)
    } else {
        (extends.into_iter().next(), implements)
    };

    let import_pattern = Regex::new(r"(?m)^\s*import\s+(static\s+)?([\w.]+(?:\.\*)?)\s*;")?;
    let prelude = &masked[..whole.start()];
    let imports = import_pattern
        .captures_iter(prelude)
        .filter_map(|c| {
            let path = c.get(2)?.as_str();
            Some(match c.get(1) {
                Some(_) => format!("static {}", path),
                None => path.to_string(),
            })
        })
        .collect();

    let prelude_end = import_pattern
        .find_iter(prelude)
        .last()
        .map(|m| m.end())
        .or_else(|| prelude.find("package").and_then(|p| prelude[p..].find(';').map(|i| p + i + 1)))
        .unwrap_or(0);
    let annotation_pattern = Regex::new(r"@[A-Za-z_][\w.]*(?:\s*\([^)]*\))?")?;
    let annotations = annotation_pattern
        .find_iter(&masked[prelude_end..whole.start()])
        .map(|m| text[prelude_end + m.start()..prelude_end + m.end()].to_string())
        .collect();

    Ok(Some(OldUnit {
        kind: kind.as_str().to_string(),
        superclass,
        interfaces,
        imports,
        annotations,
        members: split_members(text, &masked, open + 1),
    }))
}

/// Split the type body starting at `body_start` into members
fn split_members(text: &str, masked: &str, body_start: usize) -> Vec<OldMember> {
    let bytes = masked.as_bytes();
    let mut members = Vec::new();
    let mut depth = 0usize;
    let mut start = body_start;
    let mut i = body_start;

    while i < bytes.len() {
        let end = match bytes[i] {
            b'{' => {
                depth += 1;
                None
            }
            b'}' if depth == 0 => break,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    let rest = &masked[i + 1..];
                    let skipped = rest.len() - rest.trim_start().len();
                    if rest.trim_start().starts_with(';') {
                        i += skipped + 1;
                    }
                    Some(i + 1)
                } else {
                    None
                }
            }
            b';' if depth == 0 => Some(i + 1),
            _ => None,
        };
        if let Some(end) = end {
            if let Some(member) = old_member(&text[start..end], &masked[start..end]) {
                members.push(member);
            }
            start = end;
        }
        i += 1;
    }
    members
}

fn old_member(raw: &str, masked: &str) -> Option<OldMember> {
    let code_offset = masked.len() - masked.trim_start().len();
    let code = masked.trim();
    if code.is_empty() || code == ";" {
        return None;
    }
    let leading = &raw[..code_offset];
    let tagged = leading.contains(defaults::RETENTION_TAG);
    Some(OldMember {
        key: member_key(code),
        tagged,
        text: raw.trim().to_string(),
    })
}

/// Drop leading annotations such as `@Override` or `@Column(name = "x")`
fn strip_annotations(mut code: &str) -> &str {
    loop {
        code = code.trim_start();
        if !code.starts_with('@') || code.starts_with("@interface") {
            return code;
        }
        let name_end = code[1..]
            .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '.'))
            .map(|i| i + 1)
            .unwrap_or(code.len());
        code = code[name_end..].trim_start();
        if code.starts_with('(') {
            let mut depth = 0;
            let mut end = code.len();
            for (i, c) in code.char_indices() {
                match c {
                    '(' => depth += 1,
                    ')' => {
                        depth -= 1;
                        if depth == 0 {
                            end = i + 1;
                            break;
                        }
                    }
                    _ => {}
                }
            }
            code = &code[end..];
        }
    }
}

fn member_key(code: &str) -> Option<MemberKey> {
    let code = strip_annotations(code);
    let head_end = code.find(['{', '=', ';']).unwrap_or(code.len());
    let head = &code[..head_end];

    for keyword in ["class ", "interface ", "enum ", "record "] {
        if let Some(pos) = head.find(keyword) {
            let name = head[pos + keyword.len()..]
                .trim_start()
                .split(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$'))
                .next()?;
            return Some(MemberKey {
                name: name.to_string(),
                params: None,
            });
        }
    }

    if let Some(open) = head.find('(') {
        let name = last_identifier(&head[..open])?;
        let close = head.rfind(')').unwrap_or(head.len());
        let params = split_top_level(&head[open + 1..close.max(open + 1)]).len();
        return Some(MemberKey {
            name: name.to_string(),
            params: Some(params),
        });
    }

    last_identifier(head).map(|name| MemberKey {
        name: name.to_string(),
        params: None,
    })
}

fn last_identifier(text: &str) -> Option<&str> {
    text.trim_end()
        .rsplit(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$'))
        .find(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Field, Parameter, TypeKind};

    fn tagged_doc() -> Vec<String> {
        vec![defaults::RETENTION_TAG.to_string()]
    }

    fn fresh() -> CompilationUnit {
        let mut unit = CompilationUnit::new(TypeKind::Class, JavaType::new("com.example.model.Orders"));
        unit.javadoc = tagged_doc();
        let mut field = Field::new("orderCode", JavaType::new("java.lang.String"));
        field.javadoc = tagged_doc();
        unit.fields.push(field);

        let mut getter = Method::new("getOrderCode");
        getter.return_type = Some(JavaType::new("java.lang.String"));
        getter.body = Some(vec!["return orderCode;".into()]);
        getter.javadoc = tagged_doc();
        unit.methods.push(getter);

        let mut setter = Method::new("setOrderCode");
        setter.return_type = Some(JavaType::new("void"));
        setter
            .parameters
            .push(Parameter::new("orderCode", JavaType::new("java.lang.String")));
        setter.body = Some(vec!["this.orderCode = orderCode;".into()]);
        setter.javadoc = tagged_doc();
        unit.methods.push(setter);
        unit
    }

    #[test]
    fn test_unchanged_file_is_stable() {
        let rendered = fresh().render();
        let merged = merge_java(&rendered, &fresh(), "Orders.java").unwrap();
        assert_eq!(merged, rendered);
    }

    #[test]
    fn test_hand_written_members_survive() {
        let base = fresh().render();
        let cut = base.rfind("}\n").unwrap();
        let old = format!(
            "{}\n    // keeps the code upper case\n    public String normalizedCode() {{\n        return orderCode == null ? null : orderCode.toUpperCase(); // \"}}\"\n    }}\n}}\n",
            &base[..cut]
        );

        let merged = merge_java(&old, &fresh(), "Orders.java").unwrap();
        assert_eq!(merged.matches("normalizedCode").count(), 1);
        assert!(merged.contains(
            "    // keeps the code upper case\n    public String normalizedCode() {\n"
        ));
        assert_eq!(merged.matches("getOrderCode").count(), 1);

        let again = merge_java(&merged, &fresh(), "Orders.java").unwrap();
        assert_eq!(again, merged);
    }

    #[test]
    fn test_annotated_member_keyed_by_name() {
        assert_eq!(
            member_key("@Column(name = \"code\") private String code;").map(|k| k.name),
            Some("code".to_string())
        );
        assert_eq!(
            member_key("@Override\n    public String toString() {"),
            Some(MemberKey {
                name: "toString".into(),
                params: Some(0)
            })
        );
    }

    #[test]
    fn test_untagged_member_wins_over_fresh() {
        let base = fresh().render();
        let old = base.replace(
            "    /**\n     * @mapper.generated\n     */\n    public String getOrderCode() {\n        return orderCode;\n    }\n",
            "    public String getOrderCode() {\n        return orderCode.trim();\n    }\n",
        );
        assert_ne!(old, base);
        let merged = merge_java(&old, &fresh(), "Orders.java").unwrap();
        assert!(merged.contains("return orderCode.trim();"));
        assert!(!merged.contains("        return orderCode;\n"));
    }

    #[test]
    fn test_imports_interfaces_and_annotations_unioned() {
        let base = fresh().render();
        let old = base
            .replace(
                "package com.example.model;\n\n",
                "package com.example.model;\n\nimport java.io.Serializable;\nimport java.util.Objects;\n\n",
            )
            .replace("public class Orders {", "@Deprecated\npublic class Orders implements Serializable {");
        let merged = merge_java(&old, &fresh(), "Orders.java").unwrap();
        assert!(merged.contains("import java.util.Objects;\n"));
        assert!(merged.contains("@Deprecated\npublic class Orders implements Serializable {"));
    }

    #[test]
    fn test_kind_mismatch_fails() {
        let old = "package com.example.model;\n\npublic interface Orders {\n}\n";
        let err = merge_java(old, &fresh(), "Orders.java").unwrap_err();
        assert!(matches!(err, CodegenError::MergeError { .. }));
        assert!(err.to_string().contains("declared as interface"));
    }

    #[test]
    fn test_superclass_mismatch_fails() {
        let old = fresh()
            .render()
            .replace("public class Orders {", "public class Orders extends BaseDO {");
        let err = merge_java(&old, &fresh(), "Orders.java").unwrap_err();
        assert!(err.to_string().contains("superclass is BaseDO"));
    }

    #[test]
    fn test_mask_hides_comments_and_literals() {
        let masked = mask("int a = 1; // class X {\nString s = \"{;}\"; /* } */ char c = '}';");
        assert!(!masked.contains("class"));
        assert_eq!(masked.matches('{').count(), 0);
        assert_eq!(masked.matches('}').count(), 0);
        assert_eq!(masked.len(), "int a = 1; // class X {\nString s = \"{;}\"; /* } */ char c = '}';".len());
    }

    #[test]
    fn test_member_keys() {
        assert_eq!(
            member_key("public void setName(String name, int x) {"),
            Some(MemberKey {
                name: "setName".into(),
                params: Some(2)
            })
        );
        assert_eq!(
            member_key("private Map<String, Integer> counts = new HashMap<>();"),
            Some(MemberKey {
                name: "counts".into(),
                params: None
            })
        );
        assert_eq!(
            member_key("public Orders() {"),
            Some(MemberKey {
                name: "Orders".into(),
                params: Some(0)
            })
        );
        assert_eq!(
            member_key("public static class Builder {").map(|k| k.name),
            Some("Builder".to_string())
        );
    }
}
