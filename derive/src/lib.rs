//! Derive macros for `deepcheck`.
use proc_macro::TokenStream as MacroTokenStream;
use proc_macro2::{Span, TokenStream};
use proc_macro_crate::FoundCrate;
use quote::quote;
use syn::{parse_macro_input, Attribute, DeriveInput, Expr, ExprLit, Ident, Lit, LitStr, Meta};

macro_rules! bail {
    ($span:expr, $($tokens:tt)*) => {
        {
            return Err(::syn::Error::new_spanned(
                $span,
                format!($($tokens)*)
            ));
        }
    };
}

/// Path of the runtime crate, either used directly or through the `deepcheck` umbrella crate.
fn resolve_crate() -> TokenStream {
    let ident = |name: &str| Ident::new_raw(name, Span::call_site());

    match proc_macro_crate::crate_name("deepcheck-deep") {
        Ok(FoundCrate::Name(name)) => {
            let name = ident(&name);
            quote!(:: #name)
        }
        // Covers integration tests too, the library itself declares `extern crate self`.
        Ok(FoundCrate::Itself) => quote!(::deepcheck_deep),
        Err(_) => match proc_macro_crate::crate_name("deepcheck") {
            Ok(FoundCrate::Name(name)) => {
                let name = ident(&name);
                quote!(:: #name::deep)
            }
            _ => quote!(::deepcheck::deep),
        },
    }
}

/// Collects the string values of all `#[deep = "..."]` attributes.
fn deep_attrs(attrs: &[Attribute]) -> syn::Result<Vec<LitStr>> {
    let mut found = vec![];
    for attr in attrs {
        if !attr.path().is_ident("deep") {
            continue;
        }
        let Meta::NameValue(meta) = &attr.meta else {
            bail!(attr, "expected `#[deep = \"...\"]`");
        };
        let Expr::Lit(ExprLit {
            lit: Lit::Str(text),
            ..
        }) = &meta.value
        else {
            bail!(&meta.value, "expected a string literal");
        };
        found.push(text.clone());
    }
    Ok(found)
}

mod directive;
mod inspect;

#[proc_macro_derive(Inspect, attributes(deep))]
pub fn derive_inspect(input: MacroTokenStream) -> MacroTokenStream {
    inspect::derive_inspect(parse_macro_input!(input as DeriveInput))
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}
