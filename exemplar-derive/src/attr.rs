//! Parsing of `#[example(...)]` field attributes.

use proc_macro2::TokenTree;
use syn::parse::ParseStream;
use syn::{Attribute, Expr, ExprLit, ExprUnary, Lit, LitBool, Meta, Token, UnOp};

#[derive(Debug, Default)]
pub(crate) struct FieldAttrs {
    pub default: Option<String>,
    pub ignored: bool,
}

pub(crate) fn parse_field_attrs(attrs: &[Attribute]) -> syn::Result<FieldAttrs> {
    let mut parsed = FieldAttrs::default();
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("example")) {
        match &attr.meta {
            Meta::NameValue(nv) => set_default(&mut parsed, attr, expr_literal(&nv.value)?)?,
            Meta::List(list) if starts_with_keyword(&list.tokens) => {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("default") {
                        let text = parse_literal(meta.value()?)?;
                        set_default(&mut parsed, attr, text)
                    } else if meta.path.is_ident("ignored") {
                        parsed.ignored = if meta.input.peek(Token![=]) {
                            meta.value()?.parse::<LitBool>()?.value
                        } else {
                            true
                        };
                        Ok(())
                    } else {
                        Err(meta.error("expected `default = ...` or `ignored`"))
                    }
                })?;
            }
            Meta::List(_) => {
                let text = attr.parse_args_with(parse_literal)?;
                set_default(&mut parsed, attr, text)?;
            }
            Meta::Path(_) => {
                return Err(syn::Error::new_spanned(
                    attr,
                    "expected `#[example(\"value\")]` or `#[example(ignored)]`",
                ));
            }
        }
    }
    Ok(parsed)
}

fn set_default(parsed: &mut FieldAttrs, attr: &Attribute, text: String) -> syn::Result<()> {
    if parsed.default.is_some() {
        return Err(syn::Error::new_spanned(attr, "duplicate default value"));
    }
    parsed.default = Some(text);
    Ok(())
}

// `true`/`false` are literals, every other leading identifier is a key.
fn starts_with_keyword(tokens: &proc_macro2::TokenStream) -> bool {
    match tokens.clone().into_iter().next() {
        Some(TokenTree::Ident(ident)) => ident != "true" && ident != "false",
        _ => false,
    }
}

/// A literal, optionally negated, rendered as the source string it stands for.
fn parse_literal(input: ParseStream<'_>) -> syn::Result<String> {
    let negative = input.peek(Token![-]);
    if negative {
        input.parse::<Token![-]>()?;
    }
    let lit: Lit = input.parse()?;
    literal_text(&lit, negative)
}

fn expr_literal(expr: &Expr) -> syn::Result<String> {
    match expr {
        Expr::Lit(ExprLit { lit, .. }) => literal_text(lit, false),
        Expr::Unary(ExprUnary {
            op: UnOp::Neg(_),
            expr,
            ..
        }) => match &**expr {
            Expr::Lit(ExprLit { lit, .. }) => literal_text(lit, true),
            other => Err(syn::Error::new_spanned(other, "expected a literal")),
        },
        other => Err(syn::Error::new_spanned(other, "expected a literal")),
    }
}

fn literal_text(lit: &Lit, negative: bool) -> syn::Result<String> {
    let text = match lit {
        Lit::Str(s) => s.value(),
        Lit::Int(i) => i.base10_digits().to_string(),
        Lit::Float(f) => f.base10_digits().to_string(),
        Lit::Bool(b) => b.value.to_string(),
        Lit::Char(c) => c.value().to_string(),
        other => return Err(syn::Error::new_spanned(other, "unsupported literal")),
    };
    if !negative {
        return Ok(text);
    }
    match lit {
        Lit::Int(_) | Lit::Float(_) => Ok(format!("-{text}")),
        other => Err(syn::Error::new_spanned(other, "only numbers can be negated")),
    }
}
