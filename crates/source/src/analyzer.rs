use crate::error::{Result, SourceError};
use crate::types::{DeclarationUnit, FieldDecl, FuncDecl, ImportSpec, Shape, TypeDecl, TypeKind};
use tree_sitter::{Node, Parser};

/// Tree-sitter based extractor of Go declarations
pub struct GoAnalyzer {
    parser: Parser,
}

impl GoAnalyzer {
    pub fn new() -> Result<Self> {
        let language: tree_sitter::Language = tree_sitter_go::LANGUAGE.into();
        let mut parser = Parser::new();
        parser
            .set_language(&language)
            .map_err(|e| SourceError::tree_sitter(format!("Failed to set language: {e}")))?;

        Ok(Self { parser })
    }

    /// Extract the top-level declarations of one Go file
    pub fn analyze(
        &mut self,
        content: &str,
        package_path: &str,
        file_path: Option<&str>,
    ) -> Result<DeclarationUnit> {
        let tree = self
            .parser
            .parse(content, None)
            .ok_or_else(|| SourceError::parse("Failed to parse source code"))?;

        let root = tree.root_node();
        if root.has_error() {
            log::debug!(
                "{} contains syntax errors, extracting what parsed",
                file_path.unwrap_or("<memory>")
            );
        }

        let mut unit = DeclarationUnit::new(package_path);
        unit.file_path = file_path.map(str::to_string);

        let mut comments = CommentRun::default();
        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            match child.kind() {
                "comment" => {
                    comments.push(content, child);
                    continue;
                }
                "import_declaration" => extract_imports(content, child, &mut unit.imports),
                "function_declaration" | "method_declaration" => {
                    let doc = comments.take_attached(child);
                    if let Some(decl) = extract_func(content, child, doc) {
                        unit.funcs.push(decl);
                    }
                }
                "type_declaration" => {
                    let doc = comments.take_attached(child);
                    extract_types(content, child, &doc, &mut unit.types);
                }
                _ => {}
            }
            comments.close(child);
        }

        log::debug!(
            "Extracted {} types and {} funcs from {}",
            unit.types.len(),
            unit.funcs.len(),
            file_path.unwrap_or("<memory>")
        );

        Ok(unit)
    }
}

/// Contiguous run of comment lines waiting for the declaration below them
#[derive(Default)]
struct CommentRun {
    lines: Vec<String>,
    end_row: usize,
    last_node_row: Option<usize>,
}

impl CommentRun {
    fn push(&mut self, content: &str, node: Node) {
        let start = node.start_position().row;

        // Trailing comment on the line of the previous declaration
        if self.last_node_row == Some(start) {
            return;
        }

        if !self.lines.is_empty() && start > self.end_row + 1 {
            self.lines.clear();
        }

        self.lines
            .extend(node_text(content, node).lines().map(str::to_string));
        self.end_row = node.end_position().row;
    }

    fn take_attached(&mut self, node: Node) -> Vec<String> {
        if self.lines.is_empty() || self.end_row + 1 != node.start_position().row {
            self.lines.clear();
            return Vec::new();
        }

        std::mem::take(&mut self.lines)
    }

    fn close(&mut self, node: Node) {
        self.lines.clear();
        self.last_node_row = Some(node.end_position().row);
    }
}

fn extract_imports(content: &str, node: Node, imports: &mut Vec<ImportSpec>) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "import_spec" => imports.extend(import_spec(content, child)),
            "import_spec_list" => {
                let mut list_cursor = child.walk();
                for spec in child.named_children(&mut list_cursor) {
                    if spec.kind() == "import_spec" {
                        imports.extend(import_spec(content, spec));
                    }
                }
            }
            _ => {}
        }
    }
}

fn import_spec(content: &str, node: Node) -> Option<ImportSpec> {
    let path = node_text(content, node.child_by_field_name("path")?)
        .trim_matches(|c| c == '"' || c == '`')
        .to_string();

    match node.child_by_field_name("name") {
        Some(name) if matches!(name.kind(), "blank_identifier" | "dot") => {
            log::debug!("Ignoring {} import of {path}", node_text(content, name));
            None
        }
        Some(name) => Some(ImportSpec::aliased(node_text(content, name), path)),
        None => Some(ImportSpec::new(path)),
    }
}

fn extract_func(content: &str, node: Node, doc: Vec<String>) -> Option<FuncDecl> {
    let name = node_text(content, node.child_by_field_name("name")?);

    let mut decl = FuncDecl::new(name);
    decl.doc = doc;

    if let Some(receiver) = node.child_by_field_name("receiver") {
        decl.receiver = extract_fields(content, receiver).into_iter().next();
    }

    if let Some(params) = node.child_by_field_name("parameters") {
        decl.params = extract_fields(content, params);
    }

    if let Some(result) = node.child_by_field_name("result") {
        decl.returns = if result.kind() == "parameter_list" {
            extract_fields(content, result)
        } else {
            vec![FieldDecl::unnamed(shape_of(content, result))]
        };
    }

    Some(decl)
}

/// One slot per declared name: `a, b int` yields two fields
fn extract_fields(content: &str, list: Node) -> Vec<FieldDecl> {
    let mut fields = Vec::new();
    let mut cursor = list.walk();

    for param in list.named_children(&mut cursor) {
        let variadic = match param.kind() {
            "parameter_declaration" => false,
            "variadic_parameter_declaration" => true,
            _ => continue,
        };

        let Some(type_node) = param.child_by_field_name("type") else {
            continue;
        };

        let mut shape = shape_of(content, type_node);
        if variadic {
            shape = Shape::slice(shape);
        }

        let mut name_cursor = param.walk();
        let names: Vec<&str> = param
            .children_by_field_name("name", &mut name_cursor)
            .map(|n| node_text(content, n))
            .collect();

        if names.is_empty() {
            fields.push(FieldDecl::unnamed(shape));
        } else {
            for name in names {
                fields.push(FieldDecl::named(name, shape.clone()));
            }
        }
    }

    fields
}

fn shape_of(content: &str, node: Node) -> Shape {
    let field_shape = |field: &str| {
        node.child_by_field_name(field)
            .map(|child| shape_of(content, child))
    };

    let shape = match node.kind() {
        "type_identifier" | "identifier" => Some(Shape::named(node_text(content, node))),
        "qualified_type" => match (
            node.child_by_field_name("package"),
            node.child_by_field_name("name"),
        ) {
            (Some(package), Some(name)) => Some(Shape::qualified(
                node_text(content, package),
                node_text(content, name),
            )),
            _ => None,
        },
        "pointer_type" => node.named_child(0).map(|inner| Shape::pointer(shape_of(content, inner))),
        "slice_type" | "array_type" | "implicit_length_array_type" => {
            field_shape("element").map(Shape::slice)
        }
        "map_type" => match (field_shape("key"), field_shape("value")) {
            (Some(key), Some(value)) => Some(Shape::map(key, value)),
            _ => None,
        },
        // Type arguments are not tracked, `Repo[T]` is `Repo`
        "generic_type" => field_shape("type"),
        "parenthesized_type" => node.named_child(0).map(|inner| shape_of(content, inner)),
        _ => None,
    };

    shape.unwrap_or_else(|| Shape::unsupported(node_text(content, node)))
}

fn extract_types(content: &str, node: Node, group_doc: &[String], types: &mut Vec<TypeDecl>) {
    let mut comments = CommentRun::default();
    let mut cursor = node.walk();

    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "comment" => {
                comments.push(content, child);
                continue;
            }
            "type_spec" | "type_alias" => {
                let own = comments.take_attached(child);
                let doc = if own.is_empty() {
                    group_doc.to_vec()
                } else {
                    own
                };

                if let Some(decl) = type_decl(content, child, doc) {
                    types.push(decl);
                }
            }
            _ => {}
        }
        comments.close(child);
    }
}

fn type_decl(content: &str, node: Node, doc: Vec<String>) -> Option<TypeDecl> {
    let name = node_text(content, node.child_by_field_name("name")?);

    let kind = if node.kind() == "type_alias" {
        TypeKind::Alias
    } else {
        match node.child_by_field_name("type").map(|t| t.kind()) {
            Some("struct_type") => TypeKind::Struct,
            Some("interface_type") => TypeKind::Interface,
            _ => TypeKind::Other,
        }
    };

    Some(TypeDecl {
        name: name.to_string(),
        kind,
        doc,
    })
}

fn node_text<'a>(content: &'a str, node: Node) -> &'a str {
    &content[node.start_byte()..node.end_byte()]
}
