//! Type descriptors.
//!
//! A [`TypeDescriptor`] is the registry's representation of one named GraphQL
//! type. Descriptors are plain data plus resolver closures; they are turned
//! into async-graphql dynamic types only when the schema is finalized, after
//! every type they reference has been resolved through the type loader.

use std::fmt;
use std::sync::Arc;

use async_graphql::dynamic::{
    Enum, EnumItem, Field, FieldFuture, InputValue, Interface, InterfaceField, Object,
    ResolverContext, Scalar, SchemaBuilder, TypeRef,
};
use contentql_core::{ContentCategory, DefinitionId};

/// Shared field resolver.
pub type Resolver = Arc<dyn for<'a> Fn(ResolverContext<'a>) -> FieldFuture<'a> + Send + Sync>;

/// Built-in scalars that never go through the type loader.
pub const BUILTIN_SCALARS: [&str; 5] = ["String", "Int", "Float", "Boolean", "ID"];

/// Returns the named type at the bottom of a (possibly wrapped) type reference.
#[must_use]
pub fn named_type(ty: &TypeRef) -> &str {
    match ty {
        TypeRef::Named(name) => name.as_ref(),
        TypeRef::NonNull(inner) | TypeRef::List(inner) => named_type(inner),
    }
}

/// Where a descriptor came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeOrigin {
    /// Content-independent types such as interfaces and scalars.
    Builtin,
    /// A root operation type.
    Root,
    /// Built by a type factory from a content definition.
    Definition {
        category: ContentCategory,
        id: DefinitionId,
    },
    /// Added by a query schema hook.
    Extension,
}

/// An argument of a field.
#[derive(Debug, Clone)]
pub struct ArgumentDescriptor {
    pub name: String,
    pub ty: TypeRef,
    pub description: Option<String>,
}

impl ArgumentDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            description: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn to_input_value(&self) -> InputValue {
        let input = InputValue::new(self.name.clone(), self.ty.clone());
        match &self.description {
            Some(description) => input.description(description.clone()),
            None => input,
        }
    }
}

/// A field of an object or interface type.
#[derive(Clone)]
pub struct FieldDescriptor {
    pub name: String,
    pub ty: TypeRef,
    pub description: Option<String>,
    pub arguments: Vec<ArgumentDescriptor>,
    resolver: Option<Resolver>,
}

impl FieldDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            description: None,
            arguments: Vec::new(),
            resolver: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn argument(mut self, argument: ArgumentDescriptor) -> Self {
        self.arguments.push(argument);
        self
    }

    /// Sets the resolver used when the field belongs to an object type.
    #[must_use]
    pub fn resolve<F>(mut self, resolver: F) -> Self
    where
        F: for<'a> Fn(ResolverContext<'a>) -> FieldFuture<'a> + Send + Sync + 'static,
    {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    #[must_use]
    pub fn has_resolver(&self) -> bool {
        self.resolver.is_some()
    }

    fn to_field(&self) -> Field {
        let resolver = self.resolver.clone();
        let mut field = Field::new(self.name.clone(), self.ty.clone(), move |ctx| {
            match &resolver {
                Some(resolve) => resolve(ctx),
                None => FieldFuture::from_value(None),
            }
        });
        if let Some(description) = &self.description {
            field = field.description(description.clone());
        }
        for argument in &self.arguments {
            field = field.argument(argument.to_input_value());
        }
        field
    }

    fn to_interface_field(&self) -> InterfaceField {
        let mut field = InterfaceField::new(self.name.clone(), self.ty.clone());
        if let Some(description) = &self.description {
            field = field.description(description.clone());
        }
        for argument in &self.arguments {
            field = field.argument(argument.to_input_value());
        }
        field
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("arguments", &self.arguments)
            .field("resolver", &self.resolver.is_some())
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ObjectDescriptor {
    pub name: String,
    pub description: Option<String>,
    pub interfaces: Vec<String>,
    pub fields: Vec<FieldDescriptor>,
    pub origin: TypeOrigin,
}

impl ObjectDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, origin: TypeOrigin) -> Self {
        Self {
            name: name.into(),
            description: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            origin,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn implement(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    #[must_use]
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Returns the field with the given name.
    #[must_use]
    pub fn get_field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone)]
pub struct InterfaceDescriptor {
    pub name: String,
    pub description: Option<String>,
    pub fields: Vec<FieldDescriptor>,
    pub origin: TypeOrigin,
}

impl InterfaceDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, origin: TypeOrigin) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: Vec::new(),
            origin,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }
}

#[derive(Debug, Clone)]
pub struct EnumDescriptor {
    pub name: String,
    pub description: Option<String>,
    /// Enum values with optional descriptions, in declaration order.
    pub values: Vec<(String, Option<String>)>,
    pub origin: TypeOrigin,
}

impl EnumDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, origin: TypeOrigin) -> Self {
        Self {
            name: name.into(),
            description: None,
            values: Vec::new(),
            origin,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn value(mut self, name: impl Into<String>, description: Option<String>) -> Self {
        self.values.push((name.into(), description));
        self
    }

    /// Value names in declaration order.
    #[must_use]
    pub fn value_names(&self) -> Vec<&str> {
        self.values.iter().map(|(name, _)| name.as_str()).collect()
    }
}

#[derive(Debug, Clone)]
pub struct ScalarDescriptor {
    pub name: String,
    pub description: Option<String>,
    pub origin: TypeOrigin,
}

impl ScalarDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, origin: TypeOrigin) -> Self {
        Self {
            name: name.into(),
            description: None,
            origin,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A named GraphQL type known to the registry.
#[derive(Debug, Clone)]
pub enum TypeDescriptor {
    Object(ObjectDescriptor),
    Interface(InterfaceDescriptor),
    Enum(EnumDescriptor),
    Scalar(ScalarDescriptor),
}

impl TypeDescriptor {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Object(t) => &t.name,
            Self::Interface(t) => &t.name,
            Self::Enum(t) => &t.name,
            Self::Scalar(t) => &t.name,
        }
    }

    #[must_use]
    pub fn origin(&self) -> TypeOrigin {
        match self {
            Self::Object(t) => t.origin,
            Self::Interface(t) => t.origin,
            Self::Enum(t) => t.origin,
            Self::Scalar(t) => t.origin,
        }
    }

    /// Kind name as used in GraphQL introspection.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Object(_) => "OBJECT",
            Self::Interface(_) => "INTERFACE",
            Self::Enum(_) => "ENUM",
            Self::Scalar(_) => "SCALAR",
        }
    }

    /// Whether values of this type have a concrete runtime type.
    #[must_use]
    pub fn is_concrete(&self) -> bool {
        !matches!(self, Self::Interface(_))
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&ObjectDescriptor> {
        match self {
            Self::Object(t) => Some(t),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_enum(&self) -> Option<&EnumDescriptor> {
        match self {
            Self::Enum(t) => Some(t),
            _ => None,
        }
    }

    /// Fields of an object or interface type.
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        match self {
            Self::Object(t) => &t.fields,
            Self::Interface(t) => &t.fields,
            Self::Enum(_) | Self::Scalar(_) => &[],
        }
    }

    /// Names of every non built-in type this type refers to: field and
    /// argument types plus implemented interfaces.
    #[must_use]
    pub fn referenced_types(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        let mut push = |name: &str| {
            if !BUILTIN_SCALARS.contains(&name) && !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        };

        if let Self::Object(object) = self {
            for interface in &object.interfaces {
                push(interface.as_str());
            }
        }
        for field in self.fields() {
            push(named_type(&field.ty));
            for argument in &field.arguments {
                push(named_type(&argument.ty));
            }
        }
        names
    }

    /// Registers the async-graphql form of this type with a schema builder.
    #[must_use]
    pub fn register_into(&self, builder: SchemaBuilder) -> SchemaBuilder {
        match self {
            Self::Object(t) => {
                let mut object = Object::new(t.name.clone());
                if let Some(description) = &t.description {
                    object = object.description(description.clone());
                }
                for interface in &t.interfaces {
                    object = object.implement(interface.clone());
                }
                for field in &t.fields {
                    object = object.field(field.to_field());
                }
                builder.register(object)
            }
            Self::Interface(t) => {
                let mut interface = Interface::new(t.name.clone());
                if let Some(description) = &t.description {
                    interface = interface.description(description.clone());
                }
                for field in &t.fields {
                    interface = interface.field(field.to_interface_field());
                }
                builder.register(interface)
            }
            Self::Enum(t) => {
                let mut enum_type = Enum::new(t.name.clone());
                if let Some(description) = &t.description {
                    enum_type = enum_type.description(description.clone());
                }
                for (value, description) in &t.values {
                    let mut item = EnumItem::new(value.clone());
                    if let Some(description) = description {
                        item = item.description(description.clone());
                    }
                    enum_type = enum_type.item(item);
                }
                builder.register(enum_type)
            }
            Self::Scalar(t) => {
                let mut scalar = Scalar::new(t.name.clone());
                if let Some(description) = &t.description {
                    scalar = scalar.description(description.clone());
                }
                builder.register(scalar)
            }
        }
    }
}
