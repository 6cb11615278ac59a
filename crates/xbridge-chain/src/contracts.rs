//! Contract bindings for the source chain.

use alloy::sol;

use crate::TransferInstruction;

sol! {
    #[sol(rpc)]
    interface IERC20 {
        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 value) external returns (bool);
    }
}

sol! {
    /// Union ZKGM bridge entrypoint.
    #[sol(rpc)]
    interface IZkgm {
        struct Instruction {
            uint8 version;
            uint8 opcode;
            bytes operand;
        }

        function send(
            uint32 channelId,
            uint64 timeoutHeight,
            uint64 timeoutTimestamp,
            bytes32 salt,
            Instruction calldata instruction
        ) external;
    }
}

impl From<&TransferInstruction> for IZkgm::Instruction {
    fn from(instruction: &TransferInstruction) -> Self {
        Self {
            version: instruction.version,
            opcode: instruction.opcode,
            operand: instruction.operand.clone(),
        }
    }
}
