use proc_macro2::TokenStream;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Fields, Ident, LitStr, Variant};

use crate::utils;

/// Spellings accepted for one enum variant. The first is canonical.
struct Spellings {
    ident: Ident,
    canonical: String,
    aliases: Vec<String>,
}

impl Spellings {
    fn all(&self) -> impl Iterator<Item = &String> {
        std::iter::once(&self.canonical).chain(&self.aliases)
    }
}

fn option_name(ident: &Ident, attrs: &[Attribute]) -> syn::Result<String> {
    let mut name = utils::to_kebab_case(&ident.to_string());
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("cli_value")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("option") {
                name = meta.value()?.parse::<LitStr>()?.value();
                return Ok(());
            }
            Err(meta.error("unsupported cli_value attribute; expected option = \"...\""))
        })?;
    }
    Ok(name)
}

fn spellings(variant: &Variant) -> syn::Result<Spellings> {
    if !matches!(variant.fields, Fields::Unit) {
        return Err(syn::Error::new_spanned(
            variant,
            "CliValue only supports enums with unit variants",
        ));
    }

    let mut canonical = utils::to_kebab_case(&variant.ident.to_string());
    let mut aliases = Vec::new();
    for attr in variant.attrs.iter().filter(|attr| attr.path().is_ident("cli")) {
        attr.parse_nested_meta(|meta| {
            let value = meta.value()?.parse::<LitStr>()?.value();
            if meta.path.is_ident("name") {
                canonical = value;
            } else if meta.path.is_ident("alias") {
                aliases.push(value);
            } else {
                return Err(meta.error("unsupported cli attribute; expected name/alias"));
            }
            Ok(())
        })?;
    }

    Ok(Spellings {
        ident: variant.ident.clone(),
        canonical,
        aliases,
    })
}

pub fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    let enum_ident = &input.ident;
    let Data::Enum(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            enum_ident,
            "CliValue can only be derived for enums",
        ));
    };
    let option = option_name(enum_ident, &input.attrs)?;

    let variants = data
        .variants
        .iter()
        .map(spellings)
        .collect::<syn::Result<Vec<_>>>()?;

    let mut seen: Vec<&String> = Vec::new();
    for variant in &variants {
        for spelling in variant.all() {
            if seen.contains(&spelling) {
                return Err(syn::Error::new_spanned(
                    &variant.ident,
                    format!("CliValue spelling `{spelling}` is used by more than one variant"),
                ));
            }
            seen.push(spelling);
        }
    }

    let canonicals: Vec<LitStr> = variants.iter().map(|v| utils::lit(&v.canonical)).collect();
    let expected = utils::lit(
        &variants
            .iter()
            .map(|v| v.canonical.as_str())
            .collect::<Vec<_>>()
            .join("|"),
    );
    let option = utils::lit(&option);

    let parse_arms = variants.iter().map(|variant| {
        let ident = &variant.ident;
        let accepted = variant.all().map(|spelling| utils::lit(spelling));
        quote! { #(#accepted)|* => Ok(Self::#ident), }
    });
    let display_arms = variants.iter().zip(&canonicals).map(|(variant, canonical)| {
        let ident = &variant.ident;
        quote! { Self::#ident => #canonical, }
    });

    Ok(quote! {
        impl #enum_ident {
            /// Canonical spellings accepted on the command line.
            pub const VARIANTS: &'static [&'static str] = &[#(#canonicals),*];

            /// `a|b|c` form used in usage text and error messages.
            pub const fn expected() -> &'static str {
                #expected
            }

            /// Case-insensitive, surrounding whitespace ignored.
            pub fn parse(raw: &str) -> crate::Result<Self> {
                match raw.trim().to_ascii_lowercase().as_str() {
                    #(#parse_arms)*
                    _ => Err(crate::Error::invalid_input(format!(
                        "Invalid value for --{}: {} (expected {})",
                        #option,
                        raw,
                        #expected
                    ))),
                }
            }
        }

        impl std::fmt::Display for #enum_ident {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(match self {
                    #(#display_arms)*
                })
            }
        }
    })
}
