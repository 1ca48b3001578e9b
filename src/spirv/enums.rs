//! Value enums for the SPIR-V enumerants the core inspects.
//!
//! Only the enumerants the analyses actually branch on are named; everything
//! else round-trips as its raw word through [`Operand::Enum`](crate::spirv::Operand).

/// Storage class of a pointer type or variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
#[allow(missing_docs)]
pub enum StorageClass {
    UniformConstant = 0,
    Input = 1,
    Uniform = 2,
    Output = 3,
    Workgroup = 4,
    CrossWorkgroup = 5,
    Private = 6,
    Function = 7,
    Generic = 8,
    PushConstant = 9,
    AtomicCounter = 10,
    Image = 11,
    StorageBuffer = 12,
}

impl StorageClass {
    /// Looks a storage class up by its numeric value.
    #[must_use]
    pub fn from_u32(value: u32) -> Option<StorageClass> {
        Some(match value {
            0 => StorageClass::UniformConstant,
            1 => StorageClass::Input,
            2 => StorageClass::Uniform,
            3 => StorageClass::Output,
            4 => StorageClass::Workgroup,
            5 => StorageClass::CrossWorkgroup,
            6 => StorageClass::Private,
            7 => StorageClass::Function,
            8 => StorageClass::Generic,
            9 => StorageClass::PushConstant,
            10 => StorageClass::AtomicCounter,
            11 => StorageClass::Image,
            12 => StorageClass::StorageBuffer,
            _ => return None,
        })
    }

    /// The raw enumerant value.
    #[must_use]
    pub fn as_u32(self) -> u32 {
        self as u32
    }
}

/// Capabilities the core checks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
#[allow(missing_docs)]
pub enum Capability {
    Matrix = 0,
    Shader = 1,
    Geometry = 2,
    Tessellation = 3,
    Addresses = 4,
    Linkage = 5,
    Kernel = 6,
    Float64 = 10,
    Int64 = 11,
    Int16 = 22,
    VariablePointersStorageBuffer = 4441,
    VariablePointers = 4442,
}

impl Capability {
    /// Looks a capability up by its numeric value.
    #[must_use]
    pub fn from_u32(value: u32) -> Option<Capability> {
        Some(match value {
            0 => Capability::Matrix,
            1 => Capability::Shader,
            2 => Capability::Geometry,
            3 => Capability::Tessellation,
            4 => Capability::Addresses,
            5 => Capability::Linkage,
            6 => Capability::Kernel,
            10 => Capability::Float64,
            11 => Capability::Int64,
            22 => Capability::Int16,
            4441 => Capability::VariablePointersStorageBuffer,
            4442 => Capability::VariablePointers,
            _ => return None,
        })
    }

    /// The raw enumerant value.
    #[must_use]
    pub fn as_u32(self) -> u32 {
        self as u32
    }
}

/// Decorations the core inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
#[allow(missing_docs)]
pub enum Decoration {
    RelaxedPrecision = 0,
    SpecId = 1,
    Block = 2,
    BufferBlock = 3,
    BuiltIn = 11,
    Location = 30,
    Binding = 33,
    DescriptorSet = 34,
    Offset = 35,
}

impl Decoration {
    /// The raw enumerant value.
    #[must_use]
    pub fn as_u32(self) -> u32 {
        self as u32
    }
}

/// Builtins the core inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
#[allow(missing_docs)]
pub enum BuiltIn {
    Position = 0,
    PointSize = 1,
    FragCoord = 15,
    WorkgroupSize = 25,
    GlobalInvocationId = 28,
}

impl BuiltIn {
    /// The raw enumerant value.
    #[must_use]
    pub fn as_u32(self) -> u32 {
        self as u32
    }
}

/// Execution models an entry point can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
#[allow(missing_docs)]
pub enum ExecutionModel {
    Vertex = 0,
    TessellationControl = 1,
    TessellationEvaluation = 2,
    Geometry = 3,
    Fragment = 4,
    GLCompute = 5,
    Kernel = 6,
}

impl ExecutionModel {
    /// The raw enumerant value.
    #[must_use]
    pub fn as_u32(self) -> u32 {
        self as u32
    }
}
