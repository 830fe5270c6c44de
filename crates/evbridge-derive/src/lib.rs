// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

extern crate proc_macro;

use proc_macro::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::punctuated::Punctuated;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Expr, Fields, Lit, LitStr, Meta, Token};

/// `#[derive(Reflect)]` macro: generates `evbridge::contract::Reflect` and
/// `MemberType` impls
///
/// Attributes:
/// - `#[contract]` / `#[contract(name = "...", namespace = "...")]` on the
///   struct opts it in as an event contract. Defaults: the struct name and a
///   namespace derived from the module path.
/// - `#[member]` on a field exports it.
/// - `#[member(base)]` on one `#[serde(flatten)]` field declares the base
///   contract.
///
/// Wire names follow serde: `#[serde(rename = "...")]` on a field and
/// `#[serde(rename_all = "...")]` on the struct are honoured.
///
/// Example:
/// ```ignore
/// use evbridge::contract::Reflect;
///
/// #[derive(Reflect, Serialize, Deserialize)]
/// #[contract(namespace = "urn:market")]
/// struct Quote {
///     #[member]
///     symbol: String,
///     #[member]
///     bid: f64,
/// }
/// ```
#[proc_macro_derive(Reflect, attributes(contract, member))]
pub fn derive_reflect(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

struct MemberInfo {
    wire_name: String,
    field_name: String,
    ty: syn::Type,
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Reflect does not support generic structs",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(f) => &f.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Only structs with named fields are supported",
                ))
            }
        },
        _ => return Err(syn::Error::new_spanned(input, "Only structs are supported")),
    };

    let contract = parse_contract(input)?;
    let rename_all = serde_container_rename_all(&input.attrs)?;

    let mut members = Vec::new();
    let mut base: Option<syn::Type> = None;

    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            return Err(syn::Error::new_spanned(field, "Field must have a name"));
        };
        let Some(member) = parse_member(&field.attrs)? else {
            continue;
        };
        let serde = serde_field(&field.attrs)?;

        if member.base {
            if base.is_some() {
                return Err(syn::Error::new_spanned(
                    field,
                    "only one #[member(base)] field is allowed",
                ));
            }
            if !serde.flatten {
                return Err(syn::Error::new_spanned(
                    field,
                    "#[member(base)] requires #[serde(flatten)]",
                ));
            }
            base = Some(field.ty.clone());
            continue;
        }

        if serde.skip {
            return Err(syn::Error::new_spanned(
                field,
                "#[member] fields must not be skipped by serde",
            ));
        }
        if serde.flatten {
            return Err(syn::Error::new_spanned(
                field,
                "flattened fields must be marked #[member(base)]",
            ));
        }

        let field_name = ident.unraw().to_string();
        let wire_name = match serde.rename {
            Some(rename) => rename,
            None => apply_rename_all(rename_all.as_deref(), &field_name),
        };
        members.push(MemberInfo {
            wire_name,
            field_name,
            ty: field.ty.clone(),
        });
    }

    let contract_tokens = match contract {
        None => quote! { ::core::option::Option::None },
        Some(c) => {
            let type_name = c.name.unwrap_or_else(|| name.unraw().to_string());
            let namespace = match c.namespace {
                Some(ns) => quote! { #ns },
                None => quote! { ::evbridge::contract::default_namespace(::core::module_path!()) },
            };
            quote! {
                ::core::option::Option::Some(::evbridge::contract::ContractInfo::new(#type_name, #namespace))
            }
        }
    };

    let base_tokens = match &base {
        None => quote! { ::core::option::Option::None },
        Some(ty) => quote! {
            ::core::option::Option::Some(<#ty as ::evbridge::contract::Reflect>::native_type)
        },
    };

    let member_tokens: Vec<_> = members
        .iter()
        .map(|m| {
            let wire = &m.wire_name;
            let field = &m.field_name;
            let ty = &m.ty;
            quote! {
                ::evbridge::contract::NativeMember {
                    name: #wire,
                    field: #field,
                    type_ref: <#ty as ::evbridge::contract::MemberType>::type_ref(),
                    optional: <#ty as ::evbridge::contract::MemberType>::OPTIONAL,
                }
            }
        })
        .collect();

    Ok(quote! {
        impl ::evbridge::contract::Reflect for #name {
            fn native_type() -> &'static ::evbridge::contract::NativeType {
                static NATIVE: ::std::sync::OnceLock<::evbridge::contract::NativeType> =
                    ::std::sync::OnceLock::new();
                NATIVE.get_or_init(|| ::evbridge::contract::NativeType {
                    rust_name: ::core::any::type_name::<#name>(),
                    contract: #contract_tokens,
                    base: #base_tokens,
                    members: ::std::vec![#(#member_tokens),*],
                })
            }
        }

        impl ::evbridge::contract::MemberType for #name {
            fn type_ref() -> ::evbridge::contract::TypeRef {
                ::evbridge::contract::TypeRef::Native(
                    <#name as ::evbridge::contract::Reflect>::native_type,
                )
            }
        }
    })
}

struct ContractAttr {
    name: Option<String>,
    namespace: Option<String>,
}

fn parse_contract(input: &DeriveInput) -> syn::Result<Option<ContractAttr>> {
    let mut found: Option<ContractAttr> = None;
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("contract")) {
        if found.is_some() {
            return Err(syn::Error::new_spanned(attr, "duplicate #[contract] attribute"));
        }
        let mut contract = ContractAttr {
            name: None,
            namespace: None,
        };
        if let Meta::List(_) = &attr.meta {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let value: LitStr = meta.value()?.parse()?;
                    contract.name = Some(value.value());
                    Ok(())
                } else if meta.path.is_ident("namespace") {
                    let value: LitStr = meta.value()?.parse()?;
                    contract.namespace = Some(value.value());
                    Ok(())
                } else {
                    Err(meta.error("expected `name` or `namespace`"))
                }
            })?;
        }
        if contract.name.as_deref() == Some("") {
            return Err(syn::Error::new_spanned(attr, "contract name must not be empty"));
        }
        found = Some(contract);
    }
    Ok(found)
}

struct MemberAttr {
    base: bool,
}

fn parse_member(attrs: &[Attribute]) -> syn::Result<Option<MemberAttr>> {
    let mut found = None;
    for attr in attrs.iter().filter(|a| a.path().is_ident("member")) {
        if found.is_some() {
            return Err(syn::Error::new_spanned(attr, "duplicate #[member] attribute"));
        }
        let mut member = MemberAttr { base: false };
        if let Meta::List(_) = &attr.meta {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("base") {
                    member.base = true;
                    Ok(())
                } else {
                    Err(meta.error("expected `base`; wire names come from #[serde(rename)]"))
                }
            })?;
        }
        found = Some(member);
    }
    Ok(found)
}

#[derive(Default)]
struct SerdeField {
    rename: Option<String>,
    skip: bool,
    flatten: bool,
}

/// `serde(...)` items as `Meta`, so unknown serde options parse cleanly.
fn serde_metas(attrs: &[Attribute]) -> syn::Result<Vec<Meta>> {
    let mut metas = Vec::new();
    for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
        let items = attr.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)?;
        metas.extend(items);
    }
    Ok(metas)
}

fn string_value(meta: &Meta) -> syn::Result<Option<String>> {
    match meta {
        Meta::NameValue(nv) => match &nv.value {
            Expr::Lit(lit) => match &lit.lit {
                Lit::Str(s) => Ok(Some(s.value())),
                other => Err(syn::Error::new_spanned(other, "expected a string literal")),
            },
            other => Err(syn::Error::new_spanned(other, "expected a string literal")),
        },
        Meta::List(list) => Err(syn::Error::new_spanned(
            list,
            "split serialize/deserialize names are not supported on contracts",
        )),
        Meta::Path(_) => Ok(None),
    }
}

fn serde_field(attrs: &[Attribute]) -> syn::Result<SerdeField> {
    let mut out = SerdeField::default();
    for meta in serde_metas(attrs)? {
        let path = meta.path();
        if path.is_ident("rename") {
            out.rename = string_value(&meta)?;
        } else if path.is_ident("skip") || path.is_ident("skip_serializing") {
            out.skip = true;
        } else if path.is_ident("flatten") {
            out.flatten = true;
        }
    }
    Ok(out)
}

fn serde_container_rename_all(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    let mut rule = None;
    for meta in serde_metas(attrs)? {
        if meta.path().is_ident("rename_all") {
            let value = string_value(&meta)?;
            if let Some(v) = &value {
                if !RENAME_RULES.contains(&v.as_str()) {
                    return Err(syn::Error::new_spanned(
                        &meta,
                        format!("unsupported rename_all rule \"{v}\""),
                    ));
                }
            }
            rule = value;
        }
    }
    Ok(rule)
}

const RENAME_RULES: &[&str] = &[
    "lowercase",
    "UPPERCASE",
    "PascalCase",
    "camelCase",
    "snake_case",
    "SCREAMING_SNAKE_CASE",
    "kebab-case",
    "SCREAMING-KEBAB-CASE",
];

/// serde's field renaming for snake_case Rust identifiers.
fn apply_rename_all(rule: Option<&str>, field: &str) -> String {
    match rule {
        None | Some("snake_case") => field.to_string(),
        Some("lowercase") => field.to_ascii_lowercase(),
        Some("UPPERCASE") => field.to_ascii_uppercase(),
        Some("SCREAMING_SNAKE_CASE") => field.to_ascii_uppercase(),
        Some("kebab-case") => field.replace('_', "-"),
        Some("SCREAMING-KEBAB-CASE") => field.replace('_', "-").to_ascii_uppercase(),
        Some("PascalCase") => pascal_case(field),
        Some("camelCase") => {
            let pascal = pascal_case(field);
            let mut chars = pascal.chars();
            match chars.next() {
                Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
                None => pascal,
            }
        }
        Some(_) => field.to_string(),
    }
}

fn pascal_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = true;
    for ch in field.chars() {
        if ch == '_' {
            upper = true;
        } else if upper {
            out.push(ch.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rename_rules_match_serde() {
        assert_eq!(apply_rename_all(Some("PascalCase"), "order_id"), "OrderId");
        assert_eq!(apply_rename_all(Some("camelCase"), "order_id"), "orderId");
        assert_eq!(apply_rename_all(Some("SCREAMING_SNAKE_CASE"), "order_id"), "ORDER_ID");
        assert_eq!(apply_rename_all(Some("kebab-case"), "order_id"), "order-id");
        assert_eq!(apply_rename_all(None, "order_id"), "order_id");
    }

    #[test]
    fn test_rejects_generics() {
        let input: DeriveInput = syn::parse_quote! {
            #[contract]
            struct Wrapper<T> { #[member] inner: T }
        };
        assert!(expand(&input).is_err());
    }

    #[test]
    fn test_rejects_enums_and_tuple_structs() {
        let tuple: DeriveInput = syn::parse_quote! {
            #[contract]
            struct Pair(i32, i32);
        };
        assert!(expand(&tuple).is_err());

        let en: DeriveInput = syn::parse_quote! {
            #[contract]
            enum Side { Buy, Sell }
        };
        assert!(expand(&en).is_err());
    }

    #[test]
    fn test_base_requires_flatten() {
        let input: DeriveInput = syn::parse_quote! {
            struct Local { #[member(base)] base: Entity }
        };
        let err = expand(&input).expect_err("missing flatten");
        assert!(err.to_string().contains("flatten"));
    }

    #[test]
    fn test_unknown_serde_options_are_tolerated() {
        let input: DeriveInput = syn::parse_quote! {
            #[contract(name = "Quote")]
            #[serde(deny_unknown_fields, rename_all = "PascalCase")]
            struct Quote {
                #[member]
                #[serde(default, rename = "Sym")]
                symbol: String,
                #[member]
                bid_price: f64,
            }
        };
        let tokens = expand(&input).expect("expands").to_string();
        assert!(tokens.contains("\"Sym\""));
        assert!(tokens.contains("\"BidPrice\""));
    }
}
