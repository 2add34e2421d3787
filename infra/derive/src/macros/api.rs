use super::derived_trait_names;
use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::parse::Parser;
use syn::punctuated::Punctuated;
use syn::{Attribute, Expr, ItemFn, ItemStruct, Lit, LitStr, Meta, MetaNameValue, Token};

/// Expands `#[api_model]`: adds serde + `ToSchema` derives and the workspace serde policy
/// (`camelCase`, `deny_unknown_fields`) unless the struct already spells them out.
pub fn expand_api_model(args: TokenStream, input: ItemStruct) -> TokenStream {
    let args = match ModelArgs::parse(args) {
        Ok(args) => args,
        Err(err) => return err.to_compile_error(),
    };
    let existing = match SerdePolicy::read(&input.attrs) {
        Ok(policy) => policy,
        Err(err) => return err.to_compile_error(),
    };

    let derives = derived_trait_names(&input.attrs);
    let mut missing = Vec::new();
    for (name, path) in [
        ("Debug", quote! { Debug }),
        ("Serialize", quote! { ::serde::Serialize }),
        ("Deserialize", quote! { ::serde::Deserialize }),
        ("ToSchema", quote! { ::utoipa::ToSchema }),
    ] {
        if !derives.contains(name) {
            missing.push(path);
        }
    }
    let derive_attr = if missing.is_empty() { quote!() } else { quote! { #[derive(#(#missing),*)] } };

    let rename = args
        .rename_all
        .unwrap_or_else(|| LitStr::new("camelCase", Span::call_site()));
    let rename_attr = match &existing.rename_all {
        Some(current) if current.value() != rename.value() => {
            return syn::Error::new_spanned(
                current,
                "conflicting serde rename_all; drop it or pass the same value to api_model",
            )
            .to_compile_error();
        },
        Some(_) => quote!(),
        None => quote! { #[serde(rename_all = #rename)] },
    };

    let deny = args.deny_unknown_fields.unwrap_or(true);
    let deny_attr = match (existing.deny_unknown_fields, deny) {
        (true, false) => {
            return syn::Error::new_spanned(
                &input.ident,
                "deny_unknown_fields is already set through serde",
            )
            .to_compile_error();
        },
        (false, true) => quote! { #[serde(deny_unknown_fields)] },
        _ => quote!(),
    };

    quote! {
        #derive_attr
        #rename_attr
        #deny_attr
        #input
    }
}

/// Expands `#[api_handler]`: forwards the arguments to `utoipa::path` so the handler
/// can be registered with `utoipa_axum::routes!`.
pub fn expand_api_handler(args: TokenStream, input: ItemFn) -> TokenStream {
    let ItemFn { attrs, vis, sig, block } = input;

    quote! {
        #(#attrs)*
        #[allow(clippy::unused_async)]
        #[::utoipa::path(#args)]
        #vis #sig #block
    }
}

#[derive(Default)]
struct ModelArgs {
    rename_all: Option<LitStr>,
    deny_unknown_fields: Option<bool>,
}

impl ModelArgs {
    fn parse(args: TokenStream) -> syn::Result<Self> {
        let metas = Punctuated::<Meta, Token![,]>::parse_terminated.parse2(args)?;
        let mut parsed = Self::default();

        for meta in metas {
            let nv = match meta {
                Meta::NameValue(nv) => nv,
                other => {
                    return Err(syn::Error::new_spanned(
                        other,
                        "expected name-value arguments like `rename_all = \"...\"`",
                    ));
                },
            };

            if nv.path.is_ident("rename_all") {
                if parsed.rename_all.is_some() {
                    return Err(syn::Error::new_spanned(nv, "duplicate rename_all"));
                }
                parsed.rename_all = Some(string_literal(&nv)?);
            } else if nv.path.is_ident("deny_unknown_fields") {
                if parsed.deny_unknown_fields.is_some() {
                    return Err(syn::Error::new_spanned(nv, "duplicate deny_unknown_fields"));
                }
                parsed.deny_unknown_fields = Some(bool_literal(&nv)?);
            } else {
                return Err(syn::Error::new_spanned(
                    nv.path,
                    "unsupported argument; expected rename_all or deny_unknown_fields",
                ));
            }
        }

        Ok(parsed)
    }
}

fn string_literal(nv: &MetaNameValue) -> syn::Result<LitStr> {
    match &nv.value {
        Expr::Lit(expr) => match &expr.lit {
            Lit::Str(lit) => Ok(lit.clone()),
            _ => Err(syn::Error::new_spanned(&nv.value, "expected a string literal")),
        },
        _ => Err(syn::Error::new_spanned(&nv.value, "expected a string literal")),
    }
}

fn bool_literal(nv: &MetaNameValue) -> syn::Result<bool> {
    match &nv.value {
        Expr::Lit(expr) => match &expr.lit {
            Lit::Bool(lit) => Ok(lit.value),
            _ => Err(syn::Error::new_spanned(&nv.value, "expected a boolean literal")),
        },
        _ => Err(syn::Error::new_spanned(&nv.value, "expected a boolean literal")),
    }
}

/// Serde container attributes already present on the struct.
struct SerdePolicy {
    rename_all: Option<LitStr>,
    deny_unknown_fields: bool,
}

impl SerdePolicy {
    fn read(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut policy = Self { rename_all: None, deny_unknown_fields: false };

        for attr in attrs.iter().filter(|attr| attr.path().is_ident("serde")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename_all") {
                    policy.rename_all = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("deny_unknown_fields") {
                    policy.deny_unknown_fields = true;
                } else if meta.input.peek(Token![=]) {
                    let _: Expr = meta.value()?.parse()?;
                }
                Ok(())
            })?;
        }

        Ok(policy)
    }
}
