use proc_macro::TokenStream;
use proc_macro2::{Ident, Span};
use quote::quote;
use syn::{Attribute, DataEnum, DataStruct, DeriveInput, Field, Fields, LitStr, Result};

/// Field names listed in `#[converter(ignored = "...")]`.
fn ignored_fields(attrs: &[Attribute]) -> Result<Vec<String>> {
    let mut ignored = vec![];
    for attr in attrs {
        if attr.path().is_ident("converter") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("ignored") {
                    let s: LitStr = meta.value()?.parse()?;
                    ignored.extend(
                        s.value()
                            .split(',')
                            .map(|f| f.trim().to_string())
                            .filter(|f| !f.is_empty()),
                    );
                    Ok(())
                } else {
                    Err(meta.error("Unknown converter attribute"))
                }
            })?;
        }
    }
    Ok(ignored)
}

/// Field initializers reading each field from `source`, a `Document`.
fn field_initializers<'a>(
    fields: impl Iterator<Item = &'a Field>,
    ignored: &[String],
    source: &Ident,
) -> Vec<proc_macro2::TokenStream> {
    fields
        .filter_map(|f| f.ident.as_ref().map(|ident| (ident, &f.ty)))
        .map(|(ident, ty)| {
            let name = ident.to_string();
            if ignored.contains(&name) {
                quote! { #ident: Default::default() }
            } else {
                quote! { #ident: docrepo::common::from_value::<#ty>(&#source.get(#name)?)? }
            }
        })
        .collect()
}

fn mapping_error(message: &str) -> proc_macro2::TokenStream {
    quote! {
        docrepo::errors::DocRepoError::new(#message, docrepo::errors::ErrorKind::ObjectMappingError)
    }
}

pub(crate) fn generate_convertible_for_struct(ast: &DeriveInput, data: &DataStruct) -> Result<TokenStream> {
    let ignored = ignored_fields(&ast.attrs)?;

    let fields: Vec<&Field> = match &data.fields {
        Fields::Named(fields) => fields.named.iter().collect(),
        _ => {
            return Err(syn::Error::new_spanned(
                ast,
                "Only structs with named fields are supported",
            ))
        }
    };

    let stored_idents: Vec<&Ident> = fields
        .iter()
        .filter_map(|f| f.ident.as_ref())
        .filter(|ident| !ignored.contains(&ident.to_string()))
        .collect();
    let stored_names: Vec<String> = stored_idents.iter().map(|i| i.to_string()).collect();

    let doc = Ident::new("doc", Span::call_site());
    let initializers = field_initializers(fields.into_iter(), &ignored, &doc);

    let name = &ast.ident;
    let not_a_document = mapping_error(&format!("Value of type '{}' is not a document", name));
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();

    let gen = quote! {
        impl #impl_generics docrepo::common::Convertible for #name #ty_generics #where_clause {
            type Output = Self;

            fn to_value(&self) -> docrepo::errors::DocRepoResult<docrepo::common::Value> {
                let mut doc = docrepo::collection::Document::new();
                #(doc.insert(#stored_names.to_string(), docrepo::common::Convertible::to_value(&self.#stored_idents)?);)*
                Ok(docrepo::common::Value::Document(doc))
            }

            fn from_value(value: &docrepo::common::Value) -> docrepo::errors::DocRepoResult<Self::Output> {
                match value {
                    docrepo::common::Value::Document(doc) => Ok(#name {
                        #(#initializers,)*
                    }),
                    _ => Err(#not_a_document),
                }
            }
        }
    };

    Ok(TokenStream::from(gen))
}

pub(crate) fn generate_convertible_for_enum(ast: &DeriveInput, data: &DataEnum) -> Result<TokenStream> {
    let name = &ast.ident;
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();
    let ignored = ignored_fields(&ast.attrs)?;
    let data_ident = Ident::new("data", Span::call_site());

    let mut to_value_variants = Vec::with_capacity(data.variants.len());
    let mut from_value_variants = Vec::with_capacity(data.variants.len());
    let mut unit_variants = Vec::with_capacity(data.variants.len());

    for variant in &data.variants {
        let variant_ident = &variant.ident;
        let variant_name = variant_ident.to_string();

        match &variant.fields {
            Fields::Named(fields) => {
                let stored_idents: Vec<&Ident> = fields
                    .named
                    .iter()
                    .filter_map(|f| f.ident.as_ref())
                    .filter(|ident| !ignored.contains(&ident.to_string()))
                    .collect();
                let stored_names: Vec<String> =
                    stored_idents.iter().map(|i| i.to_string()).collect();

                to_value_variants.push(quote! {
                    #name::#variant_ident { #(#stored_idents,)* .. } => {
                        let mut data = docrepo::collection::Document::new();
                        #(data.insert(#stored_names.to_string(), docrepo::common::Convertible::to_value(#stored_idents)?);)*
                        (#variant_name, docrepo::common::Value::Document(data))
                    }
                });

                let initializers = field_initializers(fields.named.iter(), &ignored, &data_ident);
                let not_a_document =
                    mapping_error(&format!("Data of variant '{}' is not a document", variant_name));
                from_value_variants.push(quote! {
                    #variant_name => {
                        let data = match doc.get("value")? {
                            docrepo::common::Value::Document(data) => data,
                            _ => return Err(#not_a_document),
                        };
                        Ok(#name::#variant_ident {
                            #(#initializers,)*
                        })
                    }
                });
            }
            Fields::Unnamed(fields) => {
                let field_count = fields.unnamed.len();
                let field_idents: Vec<Ident> = (0..field_count)
                    .map(|i| Ident::new(&format!("field_{}", i), Span::call_site()))
                    .collect();
                let field_indices: Vec<usize> = (0..field_count).collect();
                let field_types: Vec<&syn::Type> = fields.unnamed.iter().map(|f| &f.ty).collect();

                to_value_variants.push(quote! {
                    #name::#variant_ident(#(#field_idents),*) => {
                        let mut array = Vec::with_capacity(#field_count);
                        #(array.push(docrepo::common::Convertible::to_value(#field_idents)?);)*
                        (#variant_name, docrepo::common::Value::Array(array))
                    }
                });

                let not_an_array = mapping_error(&format!(
                    "Data of variant '{}' is not an array of {} values",
                    variant_name, field_count
                ));
                from_value_variants.push(quote! {
                    #variant_name => {
                        let data = match doc.get("value")? {
                            docrepo::common::Value::Array(data) if data.len() == #field_count => data,
                            _ => return Err(#not_an_array),
                        };
                        Ok(#name::#variant_ident(
                            #(docrepo::common::from_value::<#field_types>(&data[#field_indices])?,)*
                        ))
                    }
                });
            }
            Fields::Unit => {
                to_value_variants.push(quote! {
                    #name::#variant_ident => return Ok(docrepo::common::Value::from(#variant_name))
                });
                unit_variants.push(quote! {
                    #variant_name => Ok(#name::#variant_ident)
                });
            }
        }
    }

    let unknown_variant = mapping_error(&format!("Value is not a variant of enum '{}'", name));

    // unit variants are stored as their name, data variants as
    // { variant: name, value: data }
    let gen = quote! {
        impl #impl_generics docrepo::common::Convertible for #name #ty_generics #where_clause {
            type Output = Self;

            #[allow(unreachable_code)]
            fn to_value(&self) -> docrepo::errors::DocRepoResult<docrepo::common::Value> {
                let (variant, value): (&str, docrepo::common::Value) = match self {
                    #(#to_value_variants),*
                };
                let mut doc = docrepo::collection::Document::new();
                doc.insert("variant".to_string(), docrepo::common::Value::from(variant));
                doc.insert("value".to_string(), value);
                Ok(docrepo::common::Value::Document(doc))
            }

            fn from_value(value: &docrepo::common::Value) -> docrepo::errors::DocRepoResult<Self::Output> {
                match value {
                    docrepo::common::Value::String(variant) => match variant.as_str() {
                        #(#unit_variants,)*
                        _ => Err(#unknown_variant),
                    },
                    docrepo::common::Value::Document(doc) => match doc.get("variant")? {
                        docrepo::common::Value::String(variant) => match variant.as_str() {
                            #(#from_value_variants,)*
                            _ => Err(#unknown_variant),
                        },
                        _ => Err(#unknown_variant),
                    },
                    _ => Err(#unknown_variant),
                }
            }
        }
    };

    Ok(TokenStream::from(gen))
}
