use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{ext::IdentExt, Data, DeriveInput, Fields, LitStr, Member};

use crate::{
    deep_attrs,
    directive::{self, Container},
    resolve_crate,
};

struct FieldInfo {
    member: Member,
    name: String,
    tag: String,
}

fn fields_of(fields: &Fields) -> syn::Result<Vec<FieldInfo>> {
    fields
        .iter()
        .enumerate()
        .map(|(index, field)| {
            let tags = deep_attrs(&field.attrs)?;
            for tag in &tags {
                directive::validate_field(tag)?;
            }

            let (member, name) = match &field.ident {
                Some(ident) => (Member::from(ident.clone()), ident.unraw().to_string()),
                None => (Member::from(index), index.to_string()),
            };

            Ok(FieldInfo {
                member,
                name,
                tag: tags.iter().map(LitStr::value).collect::<Vec<_>>().join(","),
            })
        })
        .collect()
}

pub fn derive_inspect(input: DeriveInput) -> syn::Result<TokenStream> {
    #![allow(non_snake_case)]

    let DeriveInput {
        attrs,
        ident,
        mut generics,
        data,
        ..
    } = input;

    let container = directive::parse_container(&deep_attrs(&attrs)?)?;

    let deepcheck_deep = resolve_crate();

    let Inspect = quote![#deepcheck_deep::value::Inspect];
    let Record = quote![#deepcheck_deep::value::Record];
    let Value = quote![#deepcheck_deep::value::Value];
    let Kind = quote![#deepcheck_deep::value::Kind];
    let Type = quote![#deepcheck_deep::value::Type];
    let Field = quote![#deepcheck_deep::value::Field];
    let Variant = quote![#deepcheck_deep::value::Variant];
    let Option = quote![::core::option::Option];
    let usize = quote![::core::primitive::usize];

    for param in generics.type_params_mut() {
        param.bounds.push(syn::parse_quote!(#Inspect));
    }

    let target_ident = ident;
    let (impl_generics, type_generics, where_clause) = generics.split_for_impl();

    let target_type = quote![#target_ident #type_generics];

    let impl_inspect = |kind: TokenStream| {
        quote! {
            #[automatically_derived]
            impl #impl_generics #Inspect for #target_type #where_clause {
                fn inspect(&self) -> #Value<'_> {
                    #Value::new(#Type::named::<Self>(), #kind)
                }
            }
        }
    };

    let field_table = |fields: &[FieldInfo]| {
        let entries = fields.iter().map(|FieldInfo { name, tag, .. }| {
            quote![#Field { name: #name, tag: #tag }]
        });
        quote![const FIELDS: &[#Field] = &[#(#entries),*];]
    };

    let (variant_body, field_body) = match (container, &data) {
        (Container::Opaque, _) => return Ok(impl_inspect(quote![#Kind::Opaque(self)])),
        (Container::Newtype, Data::Struct(data_struct)) => {
            let mut fields = data_struct.fields.iter();
            let (Some(field), None) = (fields.next(), fields.next()) else {
                bail!(
                    &target_ident,
                    "`#[deep = \"newtype\"]` requires exactly one field"
                );
            };
            let member = match &field.ident {
                Some(ident) => Member::from(ident.clone()),
                None => Member::from(0usize),
            };
            return Ok(impl_inspect(
                quote![#Inspect::inspect(&self.#member).kind],
            ));
        }
        (Container::Newtype, _) => {
            bail!(
                &target_ident,
                "`#[deep = \"newtype\"]` is only supported for structs"
            );
        }
        (Container::Record, Data::Struct(data_struct)) => {
            let fields = fields_of(&data_struct.fields)?;
            let table = field_table(&fields);
            let arms = fields.iter().enumerate().map(|(index, FieldInfo { member, .. })| {
                quote![#index => #Option::Some(&self.#member as &dyn #Inspect),]
            });

            (
                quote! {
                    #table
                    #Variant { index: 0, name: #Option::None, fields: FIELDS }
                },
                quote! {
                    match index {
                        #(#arms)*
                        _ => #Option::None,
                    }
                },
            )
        }
        (Container::Record, Data::Enum(data_enum)) => {
            if data_enum.variants.is_empty() {
                (
                    quote![match *self {}],
                    quote! {
                        let _ = index;
                        match *self {}
                    },
                )
            } else {
                let mut variant_arms = vec![];
                let mut field_arms = vec![];

                for (variant_index, variant) in data_enum.variants.iter().enumerate() {
                    let variant_ident = &variant.ident;
                    let variant_name = variant_ident.unraw().to_string();
                    let fields = fields_of(&variant.fields)?;
                    let table = field_table(&fields);

                    variant_arms.push(quote! {
                        Self::#variant_ident { .. } => {
                            #table
                            #Variant {
                                index: #variant_index,
                                name: #Option::Some(#variant_name),
                                fields: FIELDS,
                            }
                        }
                    });

                    let binding = format_ident!("__field");
                    for (index, FieldInfo { member, .. }) in fields.iter().enumerate() {
                        field_arms.push(quote! {
                            (Self::#variant_ident { #member: #binding, .. }, #index) => {
                                #Option::Some(#binding as &dyn #Inspect)
                            }
                        });
                    }
                }

                (
                    quote! {
                        match self {
                            #(#variant_arms)*
                        }
                    },
                    quote! {
                        match (self, index) {
                            #(#field_arms)*
                            _ => #Option::None,
                        }
                    },
                )
            }
        }
        (Container::Record, Data::Union(data_union)) => {
            bail!(
                data_union.union_token,
                "can only derive `Inspect` for `struct` and `enum` types"
            );
        }
    };

    let inspect = impl_inspect(quote![#Kind::Struct(self)]);

    Ok(quote! {
        #inspect

        #[automatically_derived]
        impl #impl_generics #Record for #target_type #where_clause {
            fn variant(&self) -> #Variant {
                #variant_body
            }

            fn field(&self, index: #usize) -> #Option<&dyn #Inspect> {
                #field_body
            }
        }
    })
}
