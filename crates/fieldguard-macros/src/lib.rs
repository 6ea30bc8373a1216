//! Procedural macros for fieldguard
//!
//! This crate provides the derive used by fieldguard:
//!
//! - `#[derive(Validated)]` - Build a static schema from `#[validate(...)]`
//!   field attributes and activation options from `#[validated(...)]`

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::meta::ParseNestedMeta;
use syn::punctuated::Punctuated;
use syn::{parse_macro_input, Data, DeriveInput, Expr, Fields, LitBool, LitStr, Path, Token};

/// Derive `fieldguard::Validated`
///
/// Each `#[validate(...)]` attribute registers one rule on its field; stack
/// several attributes to register several rules, which run in order.
///
/// # Example
///
/// ```rust,ignore
/// use fieldguard::prelude::*;
///
/// #[derive(Validated)]
/// #[validated(group = "create")]
/// struct CreateUser {
///     #[validate(required, group = "create")]
///     #[validate(is_email, message = "{badEmail}", group = "create")]
///     email: Option<String>,
///
///     #[validate(is_number(min = 18, max = 120), group = "create")]
///     age: u8,
/// }
///
/// #[derive(Validated)]
/// #[validated(schema = CreateUser, group = "update", reporting)]
/// struct UpdateUser(CreateUser);
/// ```
///
/// Type options: `group = ".."`, `throwable = bool`, `reporting`,
/// `name = ".."` and `schema = OtherType` to reuse another type's rules.
#[proc_macro_derive(Validated, attributes(validate, validated))]
pub fn derive_validated(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    expand_validated(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

#[derive(Default)]
struct TypeOptions {
    name: Option<LitStr>,
    group: Option<LitStr>,
    throwable: Option<bool>,
    schema: Option<Path>,
}

impl TypeOptions {
    fn parse(input: &DeriveInput) -> syn::Result<Self> {
        let mut options = TypeOptions::default();

        for attr in input.attrs.iter().filter(|a| a.path().is_ident("validated")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    options.name = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("group") {
                    options.group = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("throwable") {
                    let lit: LitBool = meta.value()?.parse()?;
                    options.throwable = Some(lit.value);
                } else if meta.path.is_ident("reporting") {
                    options.throwable = Some(false);
                } else if meta.path.is_ident("schema") {
                    options.schema = Some(meta.value()?.parse()?);
                } else {
                    return Err(meta.error(
                        "expected `name`, `group`, `throwable`, `reporting` or `schema`",
                    ));
                }
                Ok(())
            })?;
        }

        Ok(options)
    }
}

/// One `#[validate(...)]` attribute.
struct RuleAttr {
    rule: TokenStream2,
    message: Option<LitStr>,
    groups: Vec<LitStr>,
}

impl RuleAttr {
    fn parse(attr: &syn::Attribute) -> syn::Result<Self> {
        let mut rule = None;
        let mut message = None;
        let mut groups = Vec::new();

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("message") {
                message = Some(meta.value()?.parse::<LitStr>()?);
                return Ok(());
            }
            if meta.path.is_ident("group") {
                groups.push(meta.value()?.parse::<LitStr>()?);
                return Ok(());
            }
            if rule.is_some() {
                return Err(meta.error("only one constraint per #[validate(...)]"));
            }
            rule = Some(parse_constraint(&meta)?);
            Ok(())
        })?;

        let rule = rule.ok_or_else(|| {
            syn::Error::new_spanned(attr, "#[validate(...)] needs a constraint")
        })?;

        Ok(Self {
            rule,
            message,
            groups,
        })
    }

    fn to_tokens(&self) -> TokenStream2 {
        let rule = &self.rule;
        let message = self.message.iter();
        let groups = &self.groups;
        quote! {
            #rule
                #(.message(#message))*
                #(.group(#groups))*
        }
    }
}

fn parse_constraint(meta: &ParseNestedMeta) -> syn::Result<TokenStream2> {
    let ident = meta
        .path
        .get_ident()
        .ok_or_else(|| meta.error("expected a constraint name"))?
        .to_string();

    let rule = match ident.as_str() {
        "not_empty" => quote!(::fieldguard::Rule::not_empty()),
        "is_boolean" => quote!(::fieldguard::Rule::is_boolean()),
        "is_string" => quote!(::fieldguard::Rule::is_string()),
        "not_empty_string" => quote!(::fieldguard::Rule::not_empty_string()),
        "is_array" => quote!(::fieldguard::Rule::is_array()),
        "is_email" => quote!(::fieldguard::Rule::is_email()),
        "required" => quote!(::fieldguard::Rule::required()),
        "is_number" => {
            let bounds = parse_bounds(meta)?;
            quote!(::fieldguard::Rule::is_number(#bounds))
        }
        "is_positive_number" => {
            let bounds = parse_bounds(meta)?;
            quote!(::fieldguard::Rule::is_positive_number(#bounds))
        }
        "is_positive_or_zero_number" => {
            let bounds = parse_bounds(meta)?;
            quote!(::fieldguard::Rule::is_positive_or_zero_number(#bounds))
        }
        "is_phone" => parse_phone(meta)?,
        "is_member_of" => {
            let content;
            syn::parenthesized!(content in meta.input);
            let candidates = Punctuated::<Expr, Token![,]>::parse_terminated(&content)?;
            let candidates = candidates.iter();
            quote! {
                ::fieldguard::Rule::is_member_of(
                    ::std::vec::Vec::<::fieldguard::Value>::from([
                        #(::fieldguard::Value::from(#candidates)),*
                    ])
                )
            }
        }
        "custom" => parse_custom(meta)?,
        _ => return Err(meta.error(format!("unknown constraint `{}`", ident))),
    };

    Ok(rule)
}

fn parse_bounds(meta: &ParseNestedMeta) -> syn::Result<TokenStream2> {
    let mut min: Option<Expr> = None;
    let mut max: Option<Expr> = None;

    if !meta.input.is_empty() && !meta.input.peek(Token![,]) {
        meta.parse_nested_meta(|inner| {
            if inner.path.is_ident("min") {
                min = Some(inner.value()?.parse()?);
            } else if inner.path.is_ident("max") {
                max = Some(inner.value()?.parse()?);
            } else {
                return Err(inner.error("expected `min` or `max`"));
            }
            Ok(())
        })?;
    }

    Ok(match (min, max) {
        (None, None) => quote!(::fieldguard::Bounds::unbounded()),
        (Some(min), None) => quote!(::fieldguard::Bounds::at_least((#min) as f64)),
        (None, Some(max)) => quote!(::fieldguard::Bounds::at_most((#max) as f64)),
        (Some(min), Some(max)) => {
            quote!(::fieldguard::Bounds::between((#min) as f64, (#max) as f64))
        }
    })
}

fn parse_phone(meta: &ParseNestedMeta) -> syn::Result<TokenStream2> {
    let mut minlen: Option<Expr> = None;
    let mut maxlen: Option<Expr> = None;

    if !meta.input.is_empty() && !meta.input.peek(Token![,]) {
        meta.parse_nested_meta(|inner| {
            if inner.path.is_ident("minlen") {
                minlen = Some(inner.value()?.parse()?);
            } else if inner.path.is_ident("maxlen") {
                maxlen = Some(inner.value()?.parse()?);
            } else {
                return Err(inner.error("expected `minlen` or `maxlen`"));
            }
            Ok(())
        })?;
    }

    if minlen.is_none() && maxlen.is_none() {
        return Ok(quote!(::fieldguard::Rule::is_phone()));
    }

    let minlen = minlen
        .map(|e| quote!((#e) as usize))
        .unwrap_or_else(|| quote!(::fieldguard::predicate::PHONE_MIN_DIGITS));
    let maxlen = maxlen
        .map(|e| quote!((#e) as usize))
        .unwrap_or_else(|| quote!(::fieldguard::predicate::PHONE_MAX_DIGITS));

    Ok(quote!(::fieldguard::Rule::is_phone_len(#minlen, #maxlen)))
}

fn parse_custom(meta: &ParseNestedMeta) -> syn::Result<TokenStream2> {
    let mut id: Option<LitStr> = None;
    let mut check: Option<Expr> = None;

    meta.parse_nested_meta(|inner| {
        if inner.path.is_ident("id") {
            id = Some(inner.value()?.parse()?);
        } else if inner.path.is_ident("check") {
            check = Some(inner.value()?.parse()?);
        } else {
            return Err(inner.error("expected `id` or `check`"));
        }
        Ok(())
    })?;

    let id = id.ok_or_else(|| meta.error("custom constraint needs `id = \"..\"`"))?;
    let check = check.ok_or_else(|| meta.error("custom constraint needs `check = path`"))?;

    Ok(quote!(::fieldguard::Rule::custom(#id, #check)))
}

fn field_registrations(input: &DeriveInput) -> syn::Result<Vec<TokenStream2>> {
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "#[derive(Validated)] only supports structs",
        ));
    };

    let mut registrations = Vec::new();

    let fields: Vec<(String, &syn::Field)> = match &data.fields {
        Fields::Named(named) => named
            .named
            .iter()
            .filter_map(|f| f.ident.as_ref().map(|ident| (ident_name(ident), f)))
            .collect(),
        Fields::Unnamed(unnamed) => unnamed
            .unnamed
            .iter()
            .enumerate()
            .map(|(i, f)| (i.to_string(), f))
            .collect(),
        Fields::Unit => Vec::new(),
    };

    for (name, field) in fields {
        for attr in field.attrs.iter().filter(|a| a.path().is_ident("validate")) {
            let rule = RuleAttr::parse(attr)?.to_tokens();
            registrations.push(quote!(.register(#name, #rule)));
        }
    }

    Ok(registrations)
}

fn ident_name(ident: &syn::Ident) -> String {
    let name = ident.to_string();
    match name.strip_prefix("r#") {
        Some(raw) => raw.to_string(),
        None => name,
    }
}

fn expand_validated(input: &DeriveInput) -> syn::Result<TokenStream2> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "#[derive(Validated)] does not support generic types",
        ));
    }

    let options = TypeOptions::parse(input)?;
    let registrations = field_registrations(input)?;
    let ident = &input.ident;

    let schema_fn = match &options.schema {
        Some(shared) => {
            if !registrations.is_empty() {
                return Err(syn::Error::new_spanned(
                    shared,
                    "a type reusing another schema cannot declare #[validate(...)] rules",
                ));
            }
            quote! {
                fn schema() -> &'static ::fieldguard::Schema {
                    <#shared as ::fieldguard::Validated>::schema()
                }

                fn messages() -> ::std::option::Option<::std::sync::Arc<::fieldguard::MessageTable>> {
                    ::fieldguard::message::installed::<Self>()
                        .or_else(<#shared as ::fieldguard::Validated>::messages)
                }
            }
        }
        None => {
            let name = options
                .name
                .as_ref()
                .map(LitStr::value)
                .unwrap_or_else(|| ident.to_string());
            quote! {
                fn schema() -> &'static ::fieldguard::Schema {
                    static SCHEMA: ::std::sync::OnceLock<::fieldguard::Schema> =
                        ::std::sync::OnceLock::new();
                    SCHEMA.get_or_init(|| {
                        match ::fieldguard::Schema::builder(#name)
                            #(#registrations)*
                            .build()
                        {
                            Ok(schema) => schema,
                            Err(err) => panic!("invalid validation rules on `{}`: {}", #name, err),
                        }
                    })
                }
            }
        }
    };

    let group = options.group.iter();
    let throwable = options.throwable.iter();

    Ok(quote! {
        impl ::fieldguard::Validated for #ident {
            #schema_fn

            fn activation() -> ::fieldguard::Activation {
                ::fieldguard::Activation::new()
                    #(.group(#group))*
                    #(.throwable(#throwable))*
            }
        }
    })
}
