use proc_macro2::Span;
use quote::{ToTokens, quote};
use syn::{
    Data, DeriveInput, Field, Fields, LitStr, Path, Type, TypePath, punctuated::Punctuated,
    token::Comma,
};

/// Named fields of a struct, or an error naming the derive that needs them.
pub fn named_fields<'a>(
    input: &'a DeriveInput,
    derive: &str,
) -> syn::Result<&'a Punctuated<Field, Comma>> {
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            format!("{derive} can only be derived for structs"),
        ));
    };
    match &data.fields {
        Fields::Named(fields) => Ok(&fields.named),
        _ => Err(syn::Error::new_spanned(
            &input.ident,
            format!("{derive} requires named fields"),
        )),
    }
}

pub fn lit(value: &str) -> LitStr {
    LitStr::new(value, Span::call_site())
}

pub fn is_bool(ty: &Type) -> bool {
    matches!(ty, Type::Path(TypePath { path, qself: None }) if path.is_ident("bool"))
}

/// Placeholder shown in usage text, e.g. `u64` or `path` for `PathBuf`.
pub fn type_label(ty: &Type) -> String {
    if let Type::Path(TypePath { path, .. }) = ty
        && let Some(seg) = path.segments.last()
    {
        return match seg.ident.to_string().as_str() {
            "String" => String::from("text"),
            "PathBuf" => String::from("path"),
            other => other.to_ascii_lowercase(),
        };
    }
    ty.to_token_stream().to_string().replace(' ', "")
}

/// Expression turning the `raw: String` option value into the field type.
pub fn parse_expr(ty: &Type, parse_with: Option<&Path>) -> proc_macro2::TokenStream {
    match parse_with {
        Some(parse_with) => quote! { #parse_with(&raw)? },
        None => quote! {
            raw.parse::<#ty>()
                .map_err(|e| crate::Error::invalid_input(format!(
                    "Invalid value for --{name}: {raw} ({e})"
                )))?
        },
    }
}

pub fn to_kebab_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for (idx, ch) in s.char_indices() {
        if ch.is_ascii_uppercase() {
            if idx > 0 {
                out.push('-');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}
