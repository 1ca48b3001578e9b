//! The static opcode table.
//!
//! Everything the core needs to know about an opcode lives here, keyed by the
//! opcode value: operand signature for decoding/encoding, and the boolean
//! classifications (terminator, branch, annotation, debug, type, constant,
//! combinator) consumed by the loader and the passes. There is deliberately no
//! per-instruction polymorphism; a single flat table drives all dispatch.
//!
//! The opcode set covers the SPIR-V 1.3 instructions the core operates on.
//! Opcodes outside this set are rejected at load with
//! [`InvalidData`](crate::Error::InvalidData).

use std::fmt;

use strum::EnumIter;

use crate::spirv::operand::OperandKind;

/// How the operand words after an opcode's fixed operands are decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tail {
    /// No trailing operands are permitted.
    None,
    /// Zero or more id references.
    Ids,
    /// Zero or more literal words.
    Literals,
    /// `(id, id)` pairs — `OpPhi`'s (value, parent) incoming list.
    IdIdPairs,
    /// `(literal, id)` pairs — `OpSwitch`'s (case value, target) list.
    LiteralIdPairs,
    /// `(id, literal)` pairs — `OpGroupMemberDecorate`'s (target, member) list.
    IdLiteralPairs,
}

/// The operand signature of an opcode.
///
/// `fixed` describes the operand kinds that must be present, in order, after
/// the optional result-type and result-id words; `tail` describes how any
/// remaining words are decoded.
#[derive(Debug)]
pub struct Signature {
    /// Whether the instruction carries a result-type id word.
    pub has_result_type: bool,
    /// Whether the instruction carries a result-id word.
    pub has_result: bool,
    /// Kinds of the fixed operands, in encoding order.
    pub fixed: &'static [OperandKind],
    /// Decoding of operands beyond the fixed ones.
    pub tail: Tail,
}

macro_rules! opcode_table {
    ($( $name:ident = $value:literal =>
          ($rt:literal, $r:literal, [$($kind:ident),*], $tail:ident) ),* $(,)?) => {
        /// A SPIR-V opcode, with its standard numeric value as discriminant.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
        #[repr(u16)]
        #[allow(missing_docs)]
        pub enum Opcode {
            $( $name = $value, )*
        }

        impl Opcode {
            /// Looks an opcode up by its numeric value.
            ///
            /// Returns `None` for values outside the supported set.
            #[must_use]
            pub fn from_u16(value: u16) -> Option<Opcode> {
                match value {
                    $( $value => Some(Opcode::$name), )*
                    _ => None,
                }
            }

            /// Returns the operand signature for this opcode.
            #[must_use]
            pub fn signature(self) -> &'static Signature {
                match self {
                    $( Opcode::$name => {
                        static SIG: Signature = Signature {
                            has_result_type: $rt,
                            has_result: $r,
                            fixed: &[$(OperandKind::$kind),*],
                            tail: Tail::$tail,
                        };
                        &SIG
                    } ),*
                }
            }

            /// Returns the standard instruction name, e.g. `"OpIAdd"`.
            #[must_use]
            pub fn name(self) -> &'static str {
                match self {
                    $( Opcode::$name => concat!("Op", stringify!($name)), )*
                }
            }
        }
    };
}

opcode_table! {
    // Miscellaneous
    Nop                      = 0   => (false, false, [], None),
    Undef                    = 1   => (true,  true,  [], None),

    // Debug
    SourceContinued          = 2   => (false, false, [LiteralString], None),
    Source                   = 3   => (false, false, [ValueEnum, LiteralInt], Literals),
    SourceExtension          = 4   => (false, false, [LiteralString], None),
    Name                     = 5   => (false, false, [IdRef, LiteralString], None),
    MemberName               = 6   => (false, false, [IdRef, LiteralInt, LiteralString], None),
    String                   = 7   => (false, true,  [LiteralString], None),
    Line                     = 8   => (false, false, [IdRef, LiteralInt, LiteralInt], None),

    // Extensions
    Extension                = 10  => (false, false, [LiteralString], None),
    ExtInstImport            = 11  => (false, true,  [LiteralString], None),
    ExtInst                  = 12  => (true,  true,  [IdRef, LiteralInt], Ids),

    // Mode setting
    MemoryModel              = 14  => (false, false, [ValueEnum, ValueEnum], None),
    EntryPoint               = 15  => (false, false, [ValueEnum, IdRef, LiteralString], Ids),
    ExecutionMode            = 16  => (false, false, [IdRef, ValueEnum], Literals),
    Capability               = 17  => (false, false, [ValueEnum], None),

    // Types
    TypeVoid                 = 19  => (false, true,  [], None),
    TypeBool                 = 20  => (false, true,  [], None),
    TypeInt                  = 21  => (false, true,  [LiteralInt, LiteralInt], None),
    TypeFloat                = 22  => (false, true,  [LiteralInt], None),
    TypeVector               = 23  => (false, true,  [IdRef, LiteralInt], None),
    TypeMatrix               = 24  => (false, true,  [IdRef, LiteralInt], None),
    TypeImage                = 25  => (false, true,  [IdRef, ValueEnum, LiteralInt, LiteralInt,
                                                     LiteralInt, LiteralInt, ValueEnum], Literals),
    TypeSampler              = 26  => (false, true,  [], None),
    TypeSampledImage         = 27  => (false, true,  [IdRef], None),
    TypeArray                = 28  => (false, true,  [IdRef, IdRef], None),
    TypeRuntimeArray         = 29  => (false, true,  [IdRef], None),
    TypeStruct               = 30  => (false, true,  [], Ids),
    TypeOpaque               = 31  => (false, true,  [LiteralString], None),
    TypePointer              = 32  => (false, true,  [ValueEnum, IdRef], None),
    TypeFunction             = 33  => (false, true,  [IdRef], Ids),
    TypeForwardPointer       = 39  => (false, false, [IdRef, ValueEnum], None),

    // Constants
    ConstantTrue             = 41  => (true,  true,  [], None),
    ConstantFalse            = 42  => (true,  true,  [], None),
    Constant                 = 43  => (true,  true,  [], Literals),
    ConstantComposite        = 44  => (true,  true,  [], Ids),
    ConstantSampler          = 45  => (true,  true,  [ValueEnum, LiteralInt, ValueEnum], None),
    ConstantNull             = 46  => (true,  true,  [], None),
    SpecConstantTrue         = 48  => (true,  true,  [], None),
    SpecConstantFalse        = 49  => (true,  true,  [], None),
    SpecConstant             = 50  => (true,  true,  [], Literals),
    SpecConstantComposite    = 51  => (true,  true,  [], Ids),
    SpecConstantOp           = 52  => (true,  true,  [ValueEnum], Ids),

    // Functions
    Function                 = 54  => (true,  true,  [ValueEnum, IdRef], None),
    FunctionParameter        = 55  => (true,  true,  [], None),
    FunctionEnd              = 56  => (false, false, [], None),
    FunctionCall             = 57  => (true,  true,  [IdRef], Ids),

    // Memory
    Variable                 = 59  => (true,  true,  [ValueEnum], Ids),
    ImageTexelPointer        = 60  => (true,  true,  [IdRef, IdRef, IdRef], None),
    Load                     = 61  => (true,  true,  [IdRef], Literals),
    Store                    = 62  => (false, false, [IdRef, IdRef], Literals),
    CopyMemory               = 63  => (false, false, [IdRef, IdRef], Literals),
    CopyMemorySized          = 64  => (false, false, [IdRef, IdRef, IdRef], Literals),
    AccessChain              = 65  => (true,  true,  [IdRef], Ids),
    InBoundsAccessChain      = 66  => (true,  true,  [IdRef], Ids),
    PtrAccessChain           = 67  => (true,  true,  [IdRef, IdRef], Ids),
    ArrayLength              = 68  => (true,  true,  [IdRef, LiteralInt], None),
    InBoundsPtrAccessChain   = 70  => (true,  true,  [IdRef, IdRef], Ids),

    // Annotations
    Decorate                 = 71  => (false, false, [IdRef, ValueEnum], Literals),
    MemberDecorate           = 72  => (false, false, [IdRef, LiteralInt, ValueEnum], Literals),
    DecorationGroup          = 73  => (false, true,  [], None),
    GroupDecorate            = 74  => (false, false, [IdRef], Ids),
    GroupMemberDecorate      = 75  => (false, false, [IdRef], IdLiteralPairs),

    // Composites
    VectorExtractDynamic     = 77  => (true,  true,  [IdRef, IdRef], None),
    VectorInsertDynamic      = 78  => (true,  true,  [IdRef, IdRef, IdRef], None),
    VectorShuffle            = 79  => (true,  true,  [IdRef, IdRef], Literals),
    CompositeConstruct       = 80  => (true,  true,  [], Ids),
    CompositeExtract         = 81  => (true,  true,  [IdRef], Literals),
    CompositeInsert          = 82  => (true,  true,  [IdRef, IdRef], Literals),
    CopyObject               = 83  => (true,  true,  [IdRef], None),
    Transpose                = 84  => (true,  true,  [IdRef], None),
    SampledImage             = 86  => (true,  true,  [IdRef, IdRef], None),

    // Conversions
    ConvertFToU              = 109 => (true,  true,  [IdRef], None),
    ConvertFToS              = 110 => (true,  true,  [IdRef], None),
    ConvertSToF              = 111 => (true,  true,  [IdRef], None),
    ConvertUToF              = 112 => (true,  true,  [IdRef], None),
    UConvert                 = 113 => (true,  true,  [IdRef], None),
    SConvert                 = 114 => (true,  true,  [IdRef], None),
    FConvert                 = 115 => (true,  true,  [IdRef], None),
    QuantizeToF16            = 116 => (true,  true,  [IdRef], None),
    Bitcast                  = 124 => (true,  true,  [IdRef], None),

    // Arithmetic
    SNegate                  = 126 => (true,  true,  [IdRef], None),
    FNegate                  = 127 => (true,  true,  [IdRef], None),
    IAdd                     = 128 => (true,  true,  [IdRef, IdRef], None),
    FAdd                     = 129 => (true,  true,  [IdRef, IdRef], None),
    ISub                     = 130 => (true,  true,  [IdRef, IdRef], None),
    FSub                     = 131 => (true,  true,  [IdRef, IdRef], None),
    IMul                     = 132 => (true,  true,  [IdRef, IdRef], None),
    FMul                     = 133 => (true,  true,  [IdRef, IdRef], None),
    UDiv                     = 134 => (true,  true,  [IdRef, IdRef], None),
    SDiv                     = 135 => (true,  true,  [IdRef, IdRef], None),
    FDiv                     = 136 => (true,  true,  [IdRef, IdRef], None),
    UMod                     = 137 => (true,  true,  [IdRef, IdRef], None),
    SRem                     = 138 => (true,  true,  [IdRef, IdRef], None),
    SMod                     = 139 => (true,  true,  [IdRef, IdRef], None),
    FRem                     = 140 => (true,  true,  [IdRef, IdRef], None),
    FMod                     = 141 => (true,  true,  [IdRef, IdRef], None),
    VectorTimesScalar        = 142 => (true,  true,  [IdRef, IdRef], None),
    MatrixTimesScalar        = 143 => (true,  true,  [IdRef, IdRef], None),
    VectorTimesMatrix        = 144 => (true,  true,  [IdRef, IdRef], None),
    MatrixTimesVector        = 145 => (true,  true,  [IdRef, IdRef], None),
    MatrixTimesMatrix        = 146 => (true,  true,  [IdRef, IdRef], None),
    OuterProduct             = 147 => (true,  true,  [IdRef, IdRef], None),
    Dot                      = 148 => (true,  true,  [IdRef, IdRef], None),
    IAddCarry                = 149 => (true,  true,  [IdRef, IdRef], None),
    ISubBorrow               = 150 => (true,  true,  [IdRef, IdRef], None),
    UMulExtended             = 151 => (true,  true,  [IdRef, IdRef], None),
    SMulExtended             = 152 => (true,  true,  [IdRef, IdRef], None),

    // Relational and logical
    Any                      = 154 => (true,  true,  [IdRef], None),
    All                      = 155 => (true,  true,  [IdRef], None),
    IsNan                    = 156 => (true,  true,  [IdRef], None),
    IsInf                    = 157 => (true,  true,  [IdRef], None),
    LogicalEqual             = 164 => (true,  true,  [IdRef, IdRef], None),
    LogicalNotEqual          = 165 => (true,  true,  [IdRef, IdRef], None),
    LogicalOr                = 166 => (true,  true,  [IdRef, IdRef], None),
    LogicalAnd               = 167 => (true,  true,  [IdRef, IdRef], None),
    LogicalNot               = 168 => (true,  true,  [IdRef], None),
    Select                   = 169 => (true,  true,  [IdRef, IdRef, IdRef], None),
    IEqual                   = 170 => (true,  true,  [IdRef, IdRef], None),
    INotEqual                = 171 => (true,  true,  [IdRef, IdRef], None),
    UGreaterThan             = 172 => (true,  true,  [IdRef, IdRef], None),
    SGreaterThan             = 173 => (true,  true,  [IdRef, IdRef], None),
    UGreaterThanEqual        = 174 => (true,  true,  [IdRef, IdRef], None),
    SGreaterThanEqual        = 175 => (true,  true,  [IdRef, IdRef], None),
    ULessThan                = 176 => (true,  true,  [IdRef, IdRef], None),
    SLessThan                = 177 => (true,  true,  [IdRef, IdRef], None),
    ULessThanEqual           = 178 => (true,  true,  [IdRef, IdRef], None),
    SLessThanEqual           = 179 => (true,  true,  [IdRef, IdRef], None),
    FOrdEqual                = 180 => (true,  true,  [IdRef, IdRef], None),
    FUnordEqual              = 181 => (true,  true,  [IdRef, IdRef], None),
    FOrdNotEqual             = 182 => (true,  true,  [IdRef, IdRef], None),
    FUnordNotEqual           = 183 => (true,  true,  [IdRef, IdRef], None),
    FOrdLessThan             = 184 => (true,  true,  [IdRef, IdRef], None),
    FUnordLessThan           = 185 => (true,  true,  [IdRef, IdRef], None),
    FOrdGreaterThan          = 186 => (true,  true,  [IdRef, IdRef], None),
    FUnordGreaterThan        = 187 => (true,  true,  [IdRef, IdRef], None),
    FOrdLessThanEqual        = 188 => (true,  true,  [IdRef, IdRef], None),
    FUnordLessThanEqual      = 189 => (true,  true,  [IdRef, IdRef], None),
    FOrdGreaterThanEqual     = 190 => (true,  true,  [IdRef, IdRef], None),
    FUnordGreaterThanEqual   = 191 => (true,  true,  [IdRef, IdRef], None),

    // Bit operations
    ShiftRightLogical        = 194 => (true,  true,  [IdRef, IdRef], None),
    ShiftRightArithmetic     = 195 => (true,  true,  [IdRef, IdRef], None),
    ShiftLeftLogical         = 196 => (true,  true,  [IdRef, IdRef], None),
    BitwiseOr                = 197 => (true,  true,  [IdRef, IdRef], None),
    BitwiseXor               = 198 => (true,  true,  [IdRef, IdRef], None),
    BitwiseAnd               = 199 => (true,  true,  [IdRef, IdRef], None),
    Not                      = 200 => (true,  true,  [IdRef], None),
    BitFieldInsert           = 201 => (true,  true,  [IdRef, IdRef, IdRef, IdRef], None),
    BitFieldSExtract         = 202 => (true,  true,  [IdRef, IdRef, IdRef], None),
    BitFieldUExtract         = 203 => (true,  true,  [IdRef, IdRef, IdRef], None),
    BitReverse               = 204 => (true,  true,  [IdRef], None),
    BitCount                 = 205 => (true,  true,  [IdRef], None),

    // Barriers and atomics
    ControlBarrier           = 224 => (false, false, [IdRef, IdRef, IdRef], None),
    MemoryBarrier            = 225 => (false, false, [IdRef, IdRef], None),
    AtomicLoad               = 227 => (true,  true,  [IdRef, IdRef, IdRef], None),
    AtomicStore              = 228 => (false, false, [IdRef, IdRef, IdRef, IdRef], None),
    AtomicExchange           = 229 => (true,  true,  [IdRef, IdRef, IdRef, IdRef], None),
    AtomicCompareExchange    = 230 => (true,  true,  [IdRef, IdRef, IdRef, IdRef, IdRef, IdRef], None),
    AtomicIIncrement         = 232 => (true,  true,  [IdRef, IdRef, IdRef], None),
    AtomicIDecrement         = 233 => (true,  true,  [IdRef, IdRef, IdRef], None),
    AtomicIAdd               = 234 => (true,  true,  [IdRef, IdRef, IdRef, IdRef], None),
    AtomicISub               = 235 => (true,  true,  [IdRef, IdRef, IdRef, IdRef], None),
    AtomicSMin               = 236 => (true,  true,  [IdRef, IdRef, IdRef, IdRef], None),
    AtomicUMin               = 237 => (true,  true,  [IdRef, IdRef, IdRef, IdRef], None),
    AtomicSMax               = 238 => (true,  true,  [IdRef, IdRef, IdRef, IdRef], None),
    AtomicUMax               = 239 => (true,  true,  [IdRef, IdRef, IdRef, IdRef], None),
    AtomicAnd                = 240 => (true,  true,  [IdRef, IdRef, IdRef, IdRef], None),
    AtomicOr                 = 241 => (true,  true,  [IdRef, IdRef, IdRef, IdRef], None),
    AtomicXor                = 242 => (true,  true,  [IdRef, IdRef, IdRef, IdRef], None),

    // Control flow
    Phi                      = 245 => (true,  true,  [], IdIdPairs),
    LoopMerge                = 246 => (false, false, [IdRef, IdRef, ValueEnum], Literals),
    SelectionMerge           = 247 => (false, false, [IdRef, ValueEnum], None),
    Label                    = 248 => (false, true,  [], None),
    Branch                   = 249 => (false, false, [IdRef], None),
    BranchConditional        = 250 => (false, false, [IdRef, IdRef, IdRef], Literals),
    Switch                   = 251 => (false, false, [IdRef, IdRef], LiteralIdPairs),
    Kill                     = 252 => (false, false, [], None),
    Return                   = 253 => (false, false, [], None),
    ReturnValue              = 254 => (false, false, [IdRef], None),
    Unreachable              = 255 => (false, false, [], None),

    // Late additions
    NoLine                   = 317 => (false, false, [], None),
    ModuleProcessed          = 330 => (false, false, [LiteralString], None),
    DecorateId               = 332 => (false, false, [IdRef, ValueEnum], Ids),
}

impl Opcode {
    /// Whether this opcode terminates a basic block.
    #[must_use]
    pub fn is_terminator(self) -> bool {
        matches!(
            self,
            Opcode::Branch
                | Opcode::BranchConditional
                | Opcode::Switch
                | Opcode::Kill
                | Opcode::Return
                | Opcode::ReturnValue
                | Opcode::Unreachable
        )
    }

    /// Whether this opcode transfers control to labels (`OpBranch`,
    /// `OpBranchConditional`, `OpSwitch`).
    #[must_use]
    pub fn is_branch(self) -> bool {
        matches!(
            self,
            Opcode::Branch | Opcode::BranchConditional | Opcode::Switch
        )
    }

    /// Whether this opcode is a merge declaration (`OpSelectionMerge` or
    /// `OpLoopMerge`).
    #[must_use]
    pub fn is_merge(self) -> bool {
        matches!(self, Opcode::SelectionMerge | Opcode::LoopMerge)
    }

    /// Whether this opcode belongs to the annotation section.
    #[must_use]
    pub fn is_annotation(self) -> bool {
        matches!(
            self,
            Opcode::Decorate
                | Opcode::MemberDecorate
                | Opcode::DecorationGroup
                | Opcode::GroupDecorate
                | Opcode::GroupMemberDecorate
                | Opcode::DecorateId
        )
    }

    /// Whether this opcode belongs to the debug sections (sources, strings,
    /// names).
    #[must_use]
    pub fn is_debug(self) -> bool {
        matches!(
            self,
            Opcode::SourceContinued
                | Opcode::Source
                | Opcode::SourceExtension
                | Opcode::Name
                | Opcode::MemberName
                | Opcode::String
                | Opcode::ModuleProcessed
        )
    }

    /// Whether this opcode is debug line information, permitted almost
    /// anywhere in the module.
    #[must_use]
    pub fn is_debug_line(self) -> bool {
        matches!(self, Opcode::Line | Opcode::NoLine)
    }

    /// Whether this opcode declares a type.
    #[must_use]
    pub fn is_type_decl(self) -> bool {
        matches!(
            self,
            Opcode::TypeVoid
                | Opcode::TypeBool
                | Opcode::TypeInt
                | Opcode::TypeFloat
                | Opcode::TypeVector
                | Opcode::TypeMatrix
                | Opcode::TypeImage
                | Opcode::TypeSampler
                | Opcode::TypeSampledImage
                | Opcode::TypeArray
                | Opcode::TypeRuntimeArray
                | Opcode::TypeStruct
                | Opcode::TypeOpaque
                | Opcode::TypePointer
                | Opcode::TypeFunction
                | Opcode::TypeForwardPointer
        )
    }

    /// Whether this opcode declares a constant.
    #[must_use]
    pub fn is_constant_decl(self) -> bool {
        matches!(
            self,
            Opcode::ConstantTrue
                | Opcode::ConstantFalse
                | Opcode::Constant
                | Opcode::ConstantComposite
                | Opcode::ConstantSampler
                | Opcode::ConstantNull
                | Opcode::SpecConstantTrue
                | Opcode::SpecConstantFalse
                | Opcode::SpecConstant
                | Opcode::SpecConstantComposite
                | Opcode::SpecConstantOp
        )
    }

    /// Whether this opcode is a combinator: no side effects, result fully
    /// determined by its operands.
    ///
    /// Non-combinators (stores, calls, barriers, atomics, terminators, mode
    /// setting) anchor liveness in dead-code analysis.
    #[must_use]
    pub fn is_combinator(self) -> bool {
        if self.is_type_decl() || self.is_constant_decl() {
            return true;
        }
        matches!(
            self,
            Opcode::Nop
                | Opcode::Undef
                | Opcode::Variable
                | Opcode::ImageTexelPointer
                | Opcode::Load
                | Opcode::AccessChain
                | Opcode::InBoundsAccessChain
                | Opcode::PtrAccessChain
                | Opcode::InBoundsPtrAccessChain
                | Opcode::ArrayLength
                | Opcode::VectorExtractDynamic
                | Opcode::VectorInsertDynamic
                | Opcode::VectorShuffle
                | Opcode::CompositeConstruct
                | Opcode::CompositeExtract
                | Opcode::CompositeInsert
                | Opcode::CopyObject
                | Opcode::Transpose
                | Opcode::SampledImage
                | Opcode::ConvertFToU
                | Opcode::ConvertFToS
                | Opcode::ConvertSToF
                | Opcode::ConvertUToF
                | Opcode::UConvert
                | Opcode::SConvert
                | Opcode::FConvert
                | Opcode::QuantizeToF16
                | Opcode::Bitcast
                | Opcode::SNegate
                | Opcode::FNegate
                | Opcode::IAdd
                | Opcode::FAdd
                | Opcode::ISub
                | Opcode::FSub
                | Opcode::IMul
                | Opcode::FMul
                | Opcode::UDiv
                | Opcode::SDiv
                | Opcode::FDiv
                | Opcode::UMod
                | Opcode::SRem
                | Opcode::SMod
                | Opcode::FRem
                | Opcode::FMod
                | Opcode::VectorTimesScalar
                | Opcode::MatrixTimesScalar
                | Opcode::VectorTimesMatrix
                | Opcode::MatrixTimesVector
                | Opcode::MatrixTimesMatrix
                | Opcode::OuterProduct
                | Opcode::Dot
                | Opcode::IAddCarry
                | Opcode::ISubBorrow
                | Opcode::UMulExtended
                | Opcode::SMulExtended
                | Opcode::Any
                | Opcode::All
                | Opcode::IsNan
                | Opcode::IsInf
                | Opcode::LogicalEqual
                | Opcode::LogicalNotEqual
                | Opcode::LogicalOr
                | Opcode::LogicalAnd
                | Opcode::LogicalNot
                | Opcode::Select
                | Opcode::IEqual
                | Opcode::INotEqual
                | Opcode::UGreaterThan
                | Opcode::SGreaterThan
                | Opcode::UGreaterThanEqual
                | Opcode::SGreaterThanEqual
                | Opcode::ULessThan
                | Opcode::SLessThan
                | Opcode::ULessThanEqual
                | Opcode::SLessThanEqual
                | Opcode::FOrdEqual
                | Opcode::FUnordEqual
                | Opcode::FOrdNotEqual
                | Opcode::FUnordNotEqual
                | Opcode::FOrdLessThan
                | Opcode::FUnordLessThan
                | Opcode::FOrdGreaterThan
                | Opcode::FUnordGreaterThan
                | Opcode::FOrdLessThanEqual
                | Opcode::FUnordLessThanEqual
                | Opcode::FOrdGreaterThanEqual
                | Opcode::FUnordGreaterThanEqual
                | Opcode::ShiftRightLogical
                | Opcode::ShiftRightArithmetic
                | Opcode::ShiftLeftLogical
                | Opcode::BitwiseOr
                | Opcode::BitwiseXor
                | Opcode::BitwiseAnd
                | Opcode::Not
                | Opcode::BitFieldInsert
                | Opcode::BitFieldSExtract
                | Opcode::BitFieldUExtract
                | Opcode::BitReverse
                | Opcode::BitCount
                | Opcode::Phi
                | Opcode::Label
                | Opcode::ExtInst
        )
    }

    /// The raw opcode value.
    #[must_use]
    pub fn as_u16(self) -> u16 {
        self as u16
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_value_round_trip() {
        for opcode in Opcode::iter() {
            assert_eq!(Opcode::from_u16(opcode.as_u16()), Some(opcode));
        }
    }

    #[test]
    fn test_unknown_value_rejected() {
        assert_eq!(Opcode::from_u16(9), None);
        assert_eq!(Opcode::from_u16(6000), None);
    }

    #[test]
    fn test_signatures_consistent() {
        for opcode in Opcode::iter() {
            let sig = opcode.signature();
            // A result type requires a result id everywhere in SPIR-V.
            if sig.has_result_type {
                assert!(sig.has_result, "{opcode} has a type but no result");
            }
            // Terminators never produce results.
            if opcode.is_terminator() {
                assert!(!sig.has_result, "{opcode} is a terminator with a result");
            }
        }
    }

    #[test]
    fn test_classifications() {
        assert!(Opcode::Branch.is_terminator());
        assert!(Opcode::Branch.is_branch());
        assert!(!Opcode::Return.is_branch());
        assert!(Opcode::Return.is_terminator());
        assert!(Opcode::LoopMerge.is_merge());
        assert!(Opcode::Decorate.is_annotation());
        assert!(Opcode::Name.is_debug());
        assert!(Opcode::TypePointer.is_type_decl());
        assert!(Opcode::SpecConstantOp.is_constant_decl());
    }

    #[test]
    fn test_combinator_partition() {
        // Pure value computation is a combinator.
        assert!(Opcode::IAdd.is_combinator());
        assert!(Opcode::Load.is_combinator());
        assert!(Opcode::Phi.is_combinator());
        assert!(Opcode::Variable.is_combinator());
        // Side effects and control flow are not.
        assert!(!Opcode::Store.is_combinator());
        assert!(!Opcode::FunctionCall.is_combinator());
        assert!(!Opcode::Return.is_combinator());
        assert!(!Opcode::AtomicIAdd.is_combinator());
        assert!(!Opcode::ControlBarrier.is_combinator());
    }
}
