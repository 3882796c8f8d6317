//! Package resolution for type-aware matching.
//!
//! With types enabled, a pattern such as `rand.Read($_)` matches calls
//! through whatever name the searched file gave the package, and stops
//! matching where a local declaration shadows the import.

use std::collections::HashMap;

use tree_sitter::Node;

use crate::sequence::ChildList;

/// Resolves identifiers in a searched file to import paths.
pub trait ImportResolver {
    /// Returns the import path `ident` refers to, or `None` when it does
    /// not name an imported package at that point in `source`.
    fn resolve(&self, ident: Node<'_>, source: &str) -> Option<&str>;
}

/// The imports declared by one Go file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileImports {
    by_name: HashMap<String, String>,
}

impl FileImports {
    /// Collects the import declarations of a parsed file.
    ///
    /// Blank and dot imports bind no name and are skipped.
    #[must_use]
    pub fn from_tree(root: Node<'_>, source: &str) -> Self {
        let mut by_name = HashMap::new();
        for decl in ChildList::of(root).children() {
            if decl.node.kind() != "import_declaration" {
                continue;
            }
            collect_specs(decl.node, source, &mut by_name);
        }
        Self { by_name }
    }

    /// Returns the import path bound to `name`, ignoring scopes.
    #[must_use]
    pub fn path_of(&self, name: &str) -> Option<&str> {
        self.by_name.get(name).map(String::as_str)
    }

    /// Number of named imports.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Whether the file has no named imports.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl ImportResolver for FileImports {
    fn resolve(&self, ident: Node<'_>, source: &str) -> Option<&str> {
        let name = source.get(ident.byte_range())?;
        let path = self.path_of(name)?;
        (!is_shadowed(ident, name, source)).then_some(path)
    }
}

fn collect_specs(node: Node<'_>, source: &str, out: &mut HashMap<String, String>) {
    for child in ChildList::of(node).children() {
        match child.node.kind() {
            "import_spec" => {
                if let Some((name, path)) = spec_binding(child.node, source) {
                    out.insert(name, path);
                }
            }
            "import_spec_list" => collect_specs(child.node, source, out),
            _ => {}
        }
    }
}

fn spec_binding(spec: Node<'_>, source: &str) -> Option<(String, String)> {
    let literal = source.get(spec.child_by_field_name("path")?.byte_range())?;
    let path = literal.trim_matches(&['"', '`'][..]).to_owned();
    let name = match spec.child_by_field_name("name") {
        Some(alias) if alias.kind() == "package_identifier" => {
            source.get(alias.byte_range())?.to_owned()
        }
        Some(_) => return None,
        None => default_name(&path)?.to_owned(),
    };
    Some((name, path))
}

/// The package name Go infers from an import path: the last element, with
/// a `/vN` major version element or `.vN` suffix dropped.
fn default_name(path: &str) -> Option<&str> {
    let mut elements = path.rsplit('/');
    let last = elements.next()?;
    let name = if is_major_version(last) {
        elements.next()?
    } else {
        last
    };
    match name.rsplit_once(".v") {
        Some((base, version)) if is_version_number(version) => Some(base),
        _ => Some(name),
    }
}

fn is_major_version(element: &str) -> bool {
    element.strip_prefix('v').is_some_and(is_version_number)
}

fn is_version_number(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

/// Whether a declaration between the file scope and `ident` rebinds `name`.
fn is_shadowed(ident: Node<'_>, name: &str, source: &str) -> bool {
    let mut current = ident;
    while let Some(parent) = current.parent() {
        if parent.kind() == "source_file" {
            break;
        }
        for child in ChildList::of(parent).children() {
            if child.node.end_byte() > ident.start_byte() {
                break;
            }
            if declares(child.node, name, source) {
                return true;
            }
        }
        current = parent;
    }
    false
}

fn declares(node: Node<'_>, name: &str, source: &str) -> bool {
    match node.kind() {
        "short_var_declaration" | "range_clause" => node
            .child_by_field_name("left")
            .is_some_and(|left| lists(left, name, source)),
        "for_clause" => node
            .child_by_field_name("initializer")
            .is_some_and(|init| declares(init, name, source)),
        "var_declaration" | "const_declaration" | "type_declaration" | "var_spec_list"
        | "parameter_list" => ChildList::of(node)
            .children()
            .iter()
            .any(|child| declares(child.node, name, source)),
        "var_spec" | "const_spec" | "type_spec" | "type_alias" | "parameter_declaration"
        | "variadic_parameter_declaration" => {
            let mut cursor = node.walk();
            node.children_by_field_name("name", &mut cursor)
                .any(|n| source.get(n.byte_range()) == Some(name))
        }
        _ => false,
    }
}

fn lists(list: Node<'_>, name: &str, source: &str) -> bool {
    ChildList::of(list)
        .children()
        .iter()
        .any(|child| source.get(child.node.byte_range()) == Some(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use rstest::rstest;

    #[rstest]
    #[case("fmt", Some("fmt"))]
    #[case("crypto/rand", Some("rand"))]
    #[case("github.com/org/mod/v2", Some("mod"))]
    #[case("gopkg.in/yaml.v3", Some("yaml"))]
    #[case("example.com/v2x", Some("v2x"))]
    fn default_names_follow_go_rules(#[case] path: &str, #[case] expected: Option<&str>) {
        assert_eq!(default_name(path), expected);
    }

    #[test]
    fn collects_aliases_and_skips_blank_imports() {
        let source = "package p\n\nimport (\n\tcr \"crypto/rand\"\n\t\"math/rand\"\n\t_ \"embed\"\n\t. \"strings\"\n)\n";
        let mut parser = Parser::new().expect("parser");
        let parsed = parser.parse(source).expect("parse");
        let imports = FileImports::from_tree(parsed.root_node(), source);

        assert_eq!(imports.path_of("cr"), Some("crypto/rand"));
        assert_eq!(imports.path_of("rand"), Some("math/rand"));
        assert_eq!(imports.len(), 2);
    }

    #[test]
    fn local_declarations_shadow_imports() {
        let source = "package p\n\nimport \"math/rand\"\n\nfunc f() {\n\t_ = rand.Int()\n\trand := 3\n\t_ = rand\n}\n";
        let mut parser = Parser::new().expect("parser");
        let parsed = parser.parse(source).expect("parse");
        let imports = FileImports::from_tree(parsed.root_node(), source);

        let first = source.find("rand.Int").expect("first use");
        let last = source.rfind("= rand").expect("shadowed use") + 2;
        let ident_at = |offset: usize| {
            parsed
                .root_node()
                .descendant_for_byte_range(offset, offset + 4)
                .expect("identifier")
        };

        assert_eq!(imports.resolve(ident_at(first), source), Some("math/rand"));
        assert_eq!(imports.resolve(ident_at(last), source), None);
    }
}
