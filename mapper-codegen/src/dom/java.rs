//! Java source-module tree and its renderer
//!
//! A [`CompilationUnit`] holds exactly one top-level class or interface.
//! Rendering is a pure function of the tree: imports are kept sorted and
//! members are emitted in insertion order, so the same tree always renders
//! to the same text.

use std::collections::BTreeSet;

const INDENT: &str = "    ";

/// A Java type reference, possibly parameterized
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JavaType {
    qualified_name: String,
    arguments: Vec<JavaType>,
}

impl JavaType {
    pub fn new(qualified_name: impl Into<String>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            arguments: Vec::new(),
        }
    }

    /// `java.util.List<inner>`
    pub fn list_of(inner: JavaType) -> Self {
        Self {
            qualified_name: "java.util.List".to_string(),
            arguments: vec![inner],
        }
    }

    pub fn int() -> Self {
        Self::new("int")
    }

    pub fn long() -> Self {
        Self::new("long")
    }

    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    pub fn arguments(&self) -> &[JavaType] {
        &self.arguments
    }

    pub fn package(&self) -> Option<&str> {
        self.qualified_name
            .rsplit_once('.')
            .map(|(package, _)| package)
    }

    /// Name as written in source: `List<Integer>`, `byte[]`
    pub fn short_name(&self) -> String {
        let base = self
            .qualified_name
            .rsplit_once('.')
            .map(|(_, name)| name)
            .unwrap_or(&self.qualified_name);
        if self.arguments.is_empty() {
            base.to_string()
        } else {
            let args: Vec<String> = self.arguments.iter().map(JavaType::short_name).collect();
            format!("{}<{}>", base, args.join(", "))
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(
            self.qualified_name.trim_end_matches("[]"),
            "boolean" | "byte" | "char" | "double" | "float" | "int" | "long" | "short" | "void"
        )
    }

    /// Imports needed to reference this type, including type arguments
    pub fn imports(&self) -> Vec<String> {
        let mut imports = Vec::new();
        self.collect_imports(&mut imports);
        imports
    }

    fn collect_imports(&self, out: &mut Vec<String>) {
        if let Some(package) = self.package() {
            if package != "java.lang" && !self.is_primitive() {
                out.push(self.qualified_name.trim_end_matches("[]").to_string());
            }
        }
        for arg in &self.arguments {
            arg.collect_imports(out);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Protected,
    Private,
    Package,
}

impl Visibility {
    fn keyword(self) -> &'static str {
        match self {
            Visibility::Public => "public ",
            Visibility::Protected => "protected ",
            Visibility::Private => "private ",
            Visibility::Package => "",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    Interface,
}

impl TypeKind {
    pub fn keyword(self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Interface => "interface",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: JavaType,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_final: bool,
    pub initializer: Option<String>,
    pub annotations: Vec<String>,
    pub javadoc: Vec<String>,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: JavaType) -> Self {
        Self {
            name: name.into(),
            ty,
            visibility: Visibility::Private,
            is_static: false,
            is_final: false,
            initializer: None,
            annotations: Vec::new(),
            javadoc: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub ty: JavaType,
    pub annotations: Vec<String>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: JavaType) -> Self {
        Self {
            name: name.into(),
            ty,
            annotations: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub name: String,
    /// `None` for constructors
    pub return_type: Option<JavaType>,
    pub visibility: Visibility,
    pub is_static: bool,
    pub parameters: Vec<Parameter>,
    /// Body lines; a method without a body renders as a declaration
    pub body: Option<Vec<String>>,
    pub annotations: Vec<String>,
    pub javadoc: Vec<String>,
}

impl Method {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            return_type: None,
            visibility: Visibility::Public,
            is_static: false,
            parameters: Vec::new(),
            body: Some(Vec::new()),
            annotations: Vec::new(),
            javadoc: Vec::new(),
        }
    }

    /// Abstract interface method
    pub fn declaration(name: impl Into<String>, return_type: JavaType) -> Self {
        Self {
            return_type: Some(return_type),
            visibility: Visibility::Package,
            body: None,
            ..Self::new(name)
        }
    }

    pub fn is_constructor(&self) -> bool {
        self.return_type.is_none()
    }
}

/// One generated `.java` file
#[derive(Debug, Clone, PartialEq)]
pub struct CompilationUnit {
    pub kind: TypeKind,
    pub ty: JavaType,
    pub visibility: Visibility,
    pub superclass: Option<JavaType>,
    pub super_interfaces: Vec<JavaType>,
    pub imports: BTreeSet<String>,
    pub annotations: Vec<String>,
    pub javadoc: Vec<String>,
    pub fields: Vec<Field>,
    pub methods: Vec<Method>,
    /// Member text carried over verbatim from an existing file
    pub retained_members: Vec<String>,
}

impl CompilationUnit {
    pub fn new(kind: TypeKind, ty: JavaType) -> Self {
        Self {
            kind,
            ty,
            visibility: Visibility::Public,
            superclass: None,
            super_interfaces: Vec::new(),
            imports: BTreeSet::new(),
            annotations: Vec::new(),
            javadoc: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            retained_members: Vec::new(),
        }
    }

    /// Import `ty` (and its type arguments) unless it lives in this package
    pub fn add_import(&mut self, ty: &JavaType) {
        let own_package = self.ty.package().map(str::to_string);
        for import in ty.imports() {
            let in_own_package = import
                .rsplit_once('.')
                .map(|(package, _)| Some(package) == own_package.as_deref())
                .unwrap_or(false);
            if !in_own_package {
                self.imports.insert(import);
            }
        }
    }

    pub fn add_super_interface(&mut self, ty: JavaType) {
        if !self.super_interfaces.contains(&ty) {
            self.add_import(&ty);
            self.super_interfaces.push(ty);
        }
    }

    pub fn add_annotation(&mut self, annotation: impl Into<String>) {
        let annotation = annotation.into();
        if !self.annotations.contains(&annotation) {
            self.annotations.push(annotation);
        }
    }

    /// File name of the rendered unit, e.g. `Orders.java`
    pub fn file_name(&self) -> String {
        format!("{}.java", self.ty.short_name())
    }

    pub fn render(&self) -> String {
        let mut out = String::new();

        if let Some(package) = self.ty.package() {
            out.push_str(&format!("package {};\n", package));
            out.push('\n');
        }

        if !self.imports.is_empty() {
            for import in &self.imports {
                out.push_str(&format!("import {};\n", import));
            }
            out.push('\n');
        }

        render_javadoc(&self.javadoc, "", &mut out);
        for annotation in &self.annotations {
            out.push_str(&format!("{}\n", annotation));
        }

        out.push_str(&format!(
            "{}{} {}",
            self.visibility.keyword(),
            self.kind.keyword(),
            self.ty.short_name()
        ));
        if let Some(superclass) = &self.superclass {
            out.push_str(&format!(" extends {}", superclass.short_name()));
        }
        if !self.super_interfaces.is_empty() {
            let keyword = match self.kind {
                TypeKind::Class => "implements",
                TypeKind::Interface => "extends",
            };
            let names: Vec<String> = self.super_interfaces.iter().map(JavaType::short_name).collect();
            out.push_str(&format!(" {} {}", keyword, names.join(", ")));
        }
        out.push_str(" {\n");

        let mut members: Vec<String> = Vec::new();
        for field in &self.fields {
            members.push(render_field(field));
        }
        for method in &self.methods {
            members.push(render_method(method, &self.ty));
        }
        for retained in &self.retained_members {
            members.push(format!("{}{}\n", INDENT, retained));
        }
        out.push_str(&members.join("\n"));

        out.push_str("}\n");
        out
    }
}

fn render_javadoc(lines: &[String], indent: &str, out: &mut String) {
    if lines.is_empty() {
        return;
    }
    out.push_str(&format!("{}/**\n", indent));
    for line in lines {
        if line.is_empty() {
            out.push_str(&format!("{} *\n", indent));
        } else {
            out.push_str(&format!("{} * {}\n", indent, line));
        }
    }
    out.push_str(&format!("{} */\n", indent));
}

fn render_field(field: &Field) -> String {
    let mut out = String::new();
    render_javadoc(&field.javadoc, INDENT, &mut out);
    for annotation in &field.annotations {
        out.push_str(&format!("{}{}\n", INDENT, annotation));
    }
    out.push_str(&format!("{}{}", INDENT, field.visibility.keyword()));
    if field.is_static {
        out.push_str("static ");
    }
    if field.is_final {
        out.push_str("final ");
    }
    out.push_str(&format!("{} {}", field.ty.short_name(), field.name));
    if let Some(init) = &field.initializer {
        out.push_str(&format!(" = {}", init));
    }
    out.push_str(";\n");
    out
}

fn render_method(method: &Method, owner: &JavaType) -> String {
    let mut out = String::new();
    render_javadoc(&method.javadoc, INDENT, &mut out);
    for annotation in &method.annotations {
        out.push_str(&format!("{}{}\n", INDENT, annotation));
    }
    out.push_str(&format!("{}{}", INDENT, method.visibility.keyword()));
    if method.is_static {
        out.push_str("static ");
    }
    match &method.return_type {
        Some(ty) => {
            out.push_str(&format!("{} {}", ty.short_name(), method.name));
        }
        None => out.push_str(&owner.short_name()),
    }
    let params: Vec<String> = method
        .parameters
        .iter()
        .map(|p| {
            let mut s = String::new();
            for annotation in &p.annotations {
                s.push_str(&format!("{} ", annotation));
            }
            s.push_str(&format!("{} {}", p.ty.short_name(), p.name));
            s
        })
        .collect();
    out.push_str(&format!("({})", params.join(", ")));

    match &method.body {
        None => out.push_str(";\n"),
        Some(lines) => {
            out.push_str(" {\n");
            for line in lines {
                if line.is_empty() {
                    out.push('\n');
                } else {
                    out.push_str(&format!("{}{}{}\n", INDENT, INDENT, line));
                }
            }
            out.push_str(&format!("{}}}\n", INDENT));
        }
    }
    out
}
