use proc_macro::TokenStream;
use quote::quote;
use syn::{DataStruct, DeriveInput, Field, Fields, LitStr, Result};

const CONVENTIONAL_ID_FIELD: &str = "id";

pub(crate) fn generate_entity_for_struct(
    ast: &DeriveInput,
    data: &DataStruct,
) -> Result<TokenStream> {
    let name = &ast.ident;
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();

    let fields: Vec<&Field> = match &data.fields {
        Fields::Named(fields) => fields.named.iter().collect(),
        _ => {
            return Err(syn::Error::new_spanned(
                ast,
                format!(
                    "Failed to derive Entity for struct '{}': only structs with named fields are supported",
                    name
                ),
            ))
        }
    };

    let mut entity_name = name.to_string();
    let mut entity_id: Option<LitStr> = None;

    for attr in &ast.attrs {
        if attr.path().is_ident("entity") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let s: LitStr = meta.value()?.parse()?;
                    if s.value().trim().is_empty() {
                        return Err(syn::Error::new_spanned(s, "Entity name cannot be empty"));
                    }
                    entity_name = s.value();
                    Ok(())
                } else if meta.path.is_ident("id") {
                    if entity_id.is_some() {
                        return Err(meta.error("Multiple id attributes are not allowed"));
                    }
                    meta.parse_nested_meta(|meta| {
                        if meta.path.is_ident("field") {
                            entity_id = Some(meta.value()?.parse()?);
                            Ok(())
                        } else {
                            Err(meta.error("Unknown id attribute"))
                        }
                    })
                } else {
                    Err(meta.error("Unknown entity attribute"))
                }
            })?;
        }
    }

    let field_names: Vec<String> = fields
        .iter()
        .filter_map(|f| f.ident.as_ref())
        .map(|ident| ident.to_string())
        .collect();

    // marked field first, then the conventional one
    let id_field = match &entity_id {
        Some(id_name) => match fields
            .iter()
            .find(|f| f.ident.as_ref().is_some_and(|ident| ident == &id_name.value()))
        {
            Some(field) => Some(*field),
            None => {
                return Err(syn::Error::new_spanned(
                    id_name,
                    format!("Field '{}' not found in struct '{}'", id_name.value(), name),
                ))
            }
        },
        None => fields.iter().copied().find(|f| {
            f.ident
                .as_ref()
                .is_some_and(|ident| ident.to_string().eq_ignore_ascii_case(CONVENTIONAL_ID_FIELD))
        }),
    };

    let id_type_code = match id_field {
        Some(field) => {
            let ty = &field.ty;
            quote! { type Id = #ty; }
        }
        None => quote! { type Id = (); },
    };

    let entity_id_code = match &entity_id {
        Some(id_name) => quote! {
            fn entity_id() -> Option<docrepo::repository::EntityId> {
                Some(docrepo::repository::EntityId::new(#id_name))
            }
        },
        None => quote! {
            fn entity_id() -> Option<docrepo::repository::EntityId> {
                None
            }
        },
    };

    let gen = quote! {
        impl #impl_generics docrepo::repository::Entity for #name #ty_generics #where_clause {
            #id_type_code

            fn entity_name() -> String {
                #entity_name.to_string()
            }

            #entity_id_code

            fn entity_fields() -> &'static [&'static str] {
                &[#(#field_names),*]
            }
        }

        impl #impl_generics docrepo::repository::IdentifierAccessor for #name #ty_generics #where_clause {}
    };

    Ok(TokenStream::from(gen))
}
