use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Field, Fields, Ident, LitStr, Type, parse_macro_input};

/// Derive `DictEntity` and, unless `#[dict(hooks)]` is given, an empty
/// `DictHooks` impl.
///
/// Every named field is exported under its own name, except fields whose
/// name starts with `_` and fields marked `#[dict(skip)]`. Those are left out
/// of the mapping and set to `Default::default()` on import.
///
/// # Struct attributes
///
/// - `#[dict(hooks)]` - the type provides its own `DictHooks` impl
/// - `#[dict(name = "...")]` - entity name used in errors and logs
///
/// # Field attributes
///
/// - `#[dict(skip)]` - not exported, `Default` on import
/// - `#[dict(rename = "key")]` - export under `key`
/// - `#[dict(default)]` - optional on import, `Default` when absent
/// - `#[dict(nested)]` - field is itself a `DictEntity`; `Option<E>` and
///   `Vec<E>` are recognised by their last path segment
///
/// ```ignore
/// #[derive(DictEntity)]
/// #[dict(hooks)]
/// struct Order {
///     id: u64,
///     #[dict(rename = "customer_name")]
///     customer: String,
///     #[dict(nested)]
///     lines: Vec<OrderLine>,
///     #[dict(default)]
///     note: Option<String>,
///     _cache: Vec<u8>,
/// }
/// ```
#[proc_macro_derive(DictEntity, attributes(dict))]
pub fn derive_dict_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_dict_entity(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

const DICT_ATTRIBUTE_NAME: &str = "dict";

#[derive(Default)]
struct TypeAttributes {
    hooks: bool,
    name: Option<String>,
}

impl TypeAttributes {
    fn parse(input: &DeriveInput) -> syn::Result<Self> {
        let mut attributes = Self::default();
        for attr in &input.attrs {
            if !attr.path().is_ident(DICT_ATTRIBUTE_NAME) {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("hooks") {
                    attributes.hooks = true;
                    Ok(())
                } else if meta.path.is_ident("name") {
                    let lit: LitStr = meta.value()?.parse()?;
                    attributes.name = Some(lit.value());
                    Ok(())
                } else {
                    Err(meta.error("expected `hooks` or `name = \"...\"`"))
                }
            })?;
        }
        Ok(attributes)
    }
}

#[derive(Default)]
struct FieldAttributes {
    skip: bool,
    default: bool,
    nested: bool,
    rename: Option<LitStr>,
}

impl FieldAttributes {
    fn parse(field: &Field) -> syn::Result<Self> {
        let mut attributes = Self::default();
        for attr in &field.attrs {
            if !attr.path().is_ident(DICT_ATTRIBUTE_NAME) {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("skip") {
                    attributes.skip = true;
                } else if meta.path.is_ident("default") {
                    attributes.default = true;
                } else if meta.path.is_ident("nested") {
                    attributes.nested = true;
                } else if meta.path.is_ident("rename") {
                    attributes.rename = Some(meta.value()?.parse()?);
                } else {
                    return Err(meta.error(
                        "expected `skip`, `default`, `nested` or `rename = \"...\"`",
                    ));
                }
                Ok(())
            })?;
        }
        Ok(attributes)
    }
}

/// How a nested entity field is stored.
enum NestedKind {
    Single,
    Optional,
    List,
}

/// An exported field, ready for code generation.
struct ExportedField<'a> {
    ident: &'a Ident,
    ty: &'a Type,
    key: String,
    default: bool,
    nested: Option<NestedKind>,
}

fn expand_dict_entity(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let type_attrs = TypeAttributes::parse(input)?;
    let entity_name = type_attrs.name.unwrap_or_else(|| name.to_string());
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "DictEntity can only be derived for structs",
        ));
    };

    let (field_infos, serialize_body, deserialize_body) = match &data.fields {
        Fields::Named(fields) => {
            let mut exported = Vec::new();
            let mut hidden = Vec::new();

            for field in &fields.named {
                let attrs = FieldAttributes::parse(field)?;
                let Some(ident) = field.ident.as_ref() else {
                    continue;
                };
                // Fields starting with `_` are never exported.
                if attrs.skip || ident.to_string().starts_with('_') {
                    hidden.push(ident);
                    continue;
                }

                let key = match &attrs.rename {
                    Some(lit) => {
                        let key = lit.value();
                        if key.is_empty() || key.starts_with('_') {
                            return Err(syn::Error::new_spanned(
                                lit,
                                "mapping keys must be non-empty and must not start with `_`",
                            ));
                        }
                        key
                    }
                    None => ident.to_string(),
                };
                if exported.iter().any(|f: &ExportedField<'_>| f.key == key) {
                    return Err(syn::Error::new_spanned(
                        ident,
                        format!("duplicate mapping key `{key}`"),
                    ));
                }

                let nested = attrs.nested.then(|| match extract_last_segment(&field.ty).as_str() {
                    "Option" => NestedKind::Optional,
                    "Vec" => NestedKind::List,
                    _ => NestedKind::Single,
                });

                exported.push(ExportedField {
                    ident,
                    ty: &field.ty,
                    key,
                    default: attrs.default,
                    nested,
                });
            }

            let infos = exported.iter().map(|f| {
                let key = &f.key;
                let ident_str = f.ident.to_string();
                let ty = f.ty;
                let required = !f.default;
                quote! {
                    dict_serializer::FieldInfo {
                        key: #key,
                        ident: #ident_str,
                        type_name: ::core::stringify!(#ty),
                        required: #required,
                    }
                }
            });

            let writes = exported.iter().map(|f| {
                let ident = f.ident;
                let key = &f.key;
                match f.nested {
                    Some(NestedKind::Single) => quote! { ctx.write_entity(#key, &self.#ident)?; },
                    Some(NestedKind::Optional) => {
                        quote! { ctx.write_optional_entity(#key, &self.#ident)?; }
                    }
                    Some(NestedKind::List) => {
                        quote! { ctx.write_entity_list(#key, &self.#ident)?; }
                    }
                    None => quote! {
                        dict_serializer::SerializeField(&self.#ident).serialize_field(#key, ctx)?;
                    },
                }
            });

            let reads = exported.iter().map(|f| {
                let ident = f.ident;
                let key = &f.key;
                let ty = f.ty;
                let read = match f.nested {
                    Some(NestedKind::Single) => quote! { ctx.read_entity::<#ty>(#key)? },
                    Some(NestedKind::Optional) => quote! { ctx.read_optional_entity(#key)? },
                    Some(NestedKind::List) => quote! { ctx.read_entity_list(#key)? },
                    None => quote! {
                        dict_serializer::DeserializeField::<#ty>::deserialize_field(#key, ctx)?
                    },
                };
                if f.default {
                    quote! {
                        #ident: if ctx.contains(#key) {
                            #read
                        } else {
                            ::core::default::Default::default()
                        }
                    }
                } else {
                    quote! { #ident: #read }
                }
            });

            let defaults = hidden.iter().map(|ident| {
                quote! { #ident: ::core::default::Default::default() }
            });

            (
                quote! { &[#(#infos),*] },
                quote! {
                    #[allow(unused_imports)]
                    use dict_serializer::SerializeFieldFallback as _;
                    #(#writes)*
                    ::core::result::Result::Ok(())
                },
                quote! {
                    #[allow(unused_imports)]
                    use dict_serializer::DeserializeFieldFallback as _;
                    ::core::result::Result::Ok(Self {
                        #(#reads,)*
                        #(#defaults,)*
                    })
                },
            )
        }
        Fields::Unit => (
            quote! { &[] },
            quote! {
                let _ = ctx;
                ::core::result::Result::Ok(())
            },
            quote! {
                let _ = ctx;
                ::core::result::Result::Ok(Self)
            },
        ),
        Fields::Unnamed(_) => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "DictEntity requires named fields; tuple structs have no field names to export",
            ));
        }
    };

    let hooks_impl = if type_attrs.hooks {
        quote! {}
    } else {
        quote! {
            impl #impl_generics dict_serializer::DictHooks for #name #ty_generics #where_clause {}
        }
    };

    Ok(quote! {
        impl #impl_generics dict_serializer::DictEntity for #name #ty_generics #where_clause {
            const NAME: &'static str = #entity_name;
            const FIELDS: &'static [dict_serializer::FieldInfo] = #field_infos;

            fn serialize_fields(
                &self,
                ctx: &mut dict_serializer::SerializeContext,
            ) -> ::core::result::Result<(), dict_serializer::SerializeError> {
                #serialize_body
            }

            fn deserialize_fields(
                ctx: &mut dict_serializer::DeserializeContext,
            ) -> ::core::result::Result<Self, dict_serializer::DeserializeError> {
                #deserialize_body
            }
        }

        #hooks_impl
    })
}

/// Extract the last segment name from a type path (e.g. `std::vec::Vec<T>` → `"Vec"`).
fn extract_last_segment(ty: &Type) -> String {
    match ty {
        Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .map(|segment| segment.ident.to_string())
            .unwrap_or_default(),
        _ => String::new(),
    }
}
